pub mod parser;
pub mod writer;

use self::parser::{ParseOptions, parse_graph};
use self::writer::write_smiles;
use super::error::StructureError;
use super::traits::StructureAdapter;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::molecule::Molecule;
use tracing::warn;

/// Upper bound on write/re-read rounds while settling on canonical text.
const MAX_CANONICAL_ROUNDS: usize = 4;

/// The built-in SMILES structure adapter.
///
/// Parsing runs the writer on its own output until the text stops changing, so the
/// canonical form stored in a [`Molecule`] is a fixed point: parsing it again and
/// writing it back yields the same string.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesAdapter {
    options: ParseOptions,
}

impl SmilesAdapter {
    pub fn new(max_fragments: usize) -> Self {
        Self::with_options(ParseOptions { max_fragments })
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }
}

impl StructureAdapter for SmilesAdapter {
    fn parse(&self, text: &str) -> Result<Molecule, StructureError> {
        let mut graph = parse_graph(text, &self.options)?;
        let mut canonical = write_smiles(&graph);
        let mut settled = false;

        for _ in 0..MAX_CANONICAL_ROUNDS {
            let reparsed = parse_graph(&canonical, &self.options)
                .map_err(|err| StructureError::new(text, err.kind))?;
            let rewritten = write_smiles(&reparsed);
            graph = reparsed;
            if rewritten == canonical {
                settled = true;
                break;
            }
            canonical = rewritten;
        }
        if !settled {
            warn!(
                input = text,
                canonical = %canonical,
                rounds = MAX_CANONICAL_ROUNDS,
                "Canonical text did not settle; re-parsing it may yield a different form."
            );
        }

        Ok(Molecule::from_parts(canonical, graph))
    }

    fn canonicalize(&self, molecule: &Molecule) -> String {
        molecule.canonical().to_string()
    }

    fn render(&self, graph: &MolecularGraph) -> String {
        write_smiles(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::error::StructureErrorKind;

    const SEEDS: &[&str] = &[
        "CC(=O)Oc1ccccc1C(=O)O",
        "CC(=O)Nc1ccc(O)cc1",
        "CC(C)Cc1ccc(cc1)C(C)C(=O)O",
        "CN1CCC[C@H]1c2cccnc2",
        "Cn1cnc2c1c(=O)n(C)c(=O)n2C",
        "Cc1ccc(cc1)-c1cc(nn1-c1ccc(cc1)S(N)(=O)=O)C(F)(F)F",
        "CN(C)C(=N)N=C(N)N",
        "C1CCC(CC1)N",
        "OC(=O)c1ccccc1O",
        "CCN(CC)CC",
    ];

    #[test]
    fn canonical_text_is_a_fixed_point() {
        let adapter = SmilesAdapter::default();
        for seed in SEEDS {
            let molecule = adapter.parse(seed).unwrap();
            let again = adapter.parse(molecule.canonical()).unwrap();
            assert_eq!(
                adapter.canonicalize(&molecule),
                adapter.canonicalize(&again),
                "seed {seed}"
            );
            assert_eq!(adapter.render(molecule.graph()), molecule.canonical());
        }
    }

    #[test]
    fn equivalent_inputs_share_one_canonical_form() {
        let adapter = SmilesAdapter::default();
        let a = adapter.parse("CCO").unwrap();
        let b = adapter.parse("OCC").unwrap();
        let c = adapter.parse("[CH3][CH2][OH]").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.canonical(), "CCO");
    }

    #[test]
    fn explicit_hydrogens_canonicalize_like_implicit_ones() {
        let adapter = SmilesAdapter::default();
        let explicit = adapter.parse("[H]OC([H])([H])[H]").unwrap();
        let implicit = adapter.parse("CO").unwrap();
        assert_eq!(explicit, implicit);
    }

    #[test]
    fn charges_and_isotopes_survive_canonicalization() {
        let adapter = SmilesAdapter::new(2);
        let salt = adapter.parse("[Na+].CC(=O)[O-]").unwrap();
        assert!(salt.canonical().contains("[Na+]"));
        assert!(salt.canonical().contains("[O-]"));

        let labelled = adapter.parse("[13CH3]O").unwrap();
        assert!(labelled.canonical().contains("[13CH3]"));
        assert_ne!(labelled, adapter.parse("CO").unwrap());
    }

    #[test]
    fn molecules_are_valid_and_count_heavy_atoms() {
        let adapter = SmilesAdapter::default();
        let aspirin = adapter.parse("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        assert!(aspirin.is_valid());
        assert_eq!(aspirin.heavy_atom_count(), 13);
    }

    #[test]
    fn parse_errors_carry_the_input_text() {
        let adapter = SmilesAdapter::default();
        let err = adapter.parse("C1CC").unwrap_err();
        assert_eq!(err.input, "C1CC");
        assert!(matches!(err.kind, StructureErrorKind::UnclosedRing { label: 1 }));
    }

    #[test]
    fn fragment_limit_follows_the_adapter_options() {
        assert!(SmilesAdapter::default().parse("CCO.O").is_err());
        assert!(SmilesAdapter::new(2).parse("CCO.O").is_ok());
        assert_eq!(SmilesAdapter::new(3).options().max_fragments, 3);
    }
}
