use super::{BondTally, DescriptorUnavailable};
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::graph::MolecularGraph;

/// Topological polar surface area (Ertl, Rohde and Selzer 2000), N and O atoms only.
///
/// Each polar atom is classified by aromaticity, charge, hydrogen count and the
/// orders of its heavy-atom bonds. An atom whose environment has no tabulated
/// fragment makes the whole descriptor unavailable.
pub fn tpsa(graph: &MolecularGraph) -> Result<f64, DescriptorUnavailable> {
    let mut area = 0.0;
    for (id, atom) in graph.atoms_iter() {
        if !matches!(atom.element, Element::N | Element::O) {
            continue;
        }
        let tally = BondTally::of(graph, id);
        area += contribution(atom, &tally).ok_or_else(|| {
            DescriptorUnavailable::new(
                "tpsa",
                format!(
                    "no polar fragment for {} with {} H, charge {} and bonds {:?}",
                    atom.smiles_symbol(),
                    atom.hydrogens,
                    atom.charge,
                    tally
                ),
            )
        })?;
    }
    Ok(area)
}

fn contribution(atom: &Atom, tally: &BondTally) -> Option<f64> {
    match atom.element {
        Element::N if tally.aromatic > 0 => aromatic_nitrogen(atom, tally),
        Element::N => nitrogen(atom, tally),
        Element::O if tally.aromatic > 0 => (atom.charge == 0).then_some(13.14),
        Element::O => oxygen(atom, tally),
        _ => Some(0.0),
    }
}

fn nitrogen(atom: &Atom, t: &BondTally) -> Option<f64> {
    let value = match (atom.charge, atom.hydrogens, t.single, t.double, t.triple) {
        (0, 0, 3, 0, 0) => 3.24,
        (0, 0, 1, 1, 0) => 12.36,
        (0, 0, 0, 0, 1) => 23.79,
        (0, 0, 1, 2, 0) => 11.68,
        (0, 0, 0, 1, 1) => 13.60,
        (0, 1, 2, 0, 0) => 12.03,
        (0, 1, 0, 1, 0) => 23.85,
        (0, 2, 1, 0, 0) => 26.02,
        (1, 0, 4, 0, 0) => 0.00,
        (1, 0, 2, 1, 0) => 3.01,
        (1, 0, 1, 0, 1) => 4.36,
        (1, 1, 3, 0, 0) => 4.44,
        (1, 1, 1, 1, 0) => 13.97,
        (1, 2, 2, 0, 0) => 16.61,
        (1, 2, 0, 1, 0) => 25.59,
        (1, 3, 1, 0, 0) => 27.64,
        _ => return None,
    };
    Some(value)
}

fn aromatic_nitrogen(atom: &Atom, t: &BondTally) -> Option<f64> {
    let value = match (atom.charge, atom.hydrogens, t.aromatic, t.single, t.double) {
        (0, 0, 2, 0, 0) => 12.89,
        (0, 0, 3, 0, 0) => 4.41,
        (0, 0, 2, 1, 0) => 4.93,
        (0, 0, 2, 0, 1) => 8.39,
        (0, 1, 2, 0, 0) => 15.79,
        (1, 0, 3, 0, 0) => 4.10,
        (1, 0, 2, 1, 0) => 3.88,
        (1, 1, 2, 0, 0) => 14.14,
        _ => return None,
    };
    Some(value)
}

fn oxygen(atom: &Atom, t: &BondTally) -> Option<f64> {
    let value = match (atom.charge, atom.hydrogens, t.single, t.double) {
        (0, 0, 2, 0) => 9.23,
        (0, 0, 0, 1) => 17.07,
        (0, 1, 1, 0) => 20.23,
        (-1, 0, 1, 0) => 23.06,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parser::{ParseOptions, parse_graph};

    fn tpsa_of(text: &str) -> Result<f64, DescriptorUnavailable> {
        tpsa(&parse_graph(text, &ParseOptions { max_fragments: 2 }).unwrap())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "{actual} != {expected}");
    }

    #[test]
    fn hydrocarbons_have_no_polar_area() {
        assert_close(tpsa_of("CCCCCC").unwrap(), 0.0);
        assert_close(tpsa_of("c1ccccc1").unwrap(), 0.0);
    }

    #[test]
    fn simple_functional_groups_match_fragment_values() {
        assert_close(tpsa_of("CCO").unwrap(), 20.23);
        assert_close(tpsa_of("COC").unwrap(), 9.23);
        assert_close(tpsa_of("CC=O").unwrap(), 17.07);
        assert_close(tpsa_of("CN").unwrap(), 26.02);
        assert_close(tpsa_of("CNC").unwrap(), 12.03);
        assert_close(tpsa_of("CN(C)C").unwrap(), 3.24);
        assert_close(tpsa_of("CC#N").unwrap(), 23.79);
    }

    #[test]
    fn aromatic_nitrogen_types_are_distinguished() {
        assert_close(tpsa_of("c1ccncc1").unwrap(), 12.89);
        assert_close(tpsa_of("c1cc[nH]c1").unwrap(), 15.79);
        assert_close(tpsa_of("Cn1cccc1").unwrap(), 4.93);
        assert_close(tpsa_of("c1ccoc1").unwrap(), 13.14);
    }

    #[test]
    fn charged_groups_use_their_own_fragments() {
        assert_close(tpsa_of("C[NH3+]").unwrap(), 27.64);
        assert_close(tpsa_of("CC(=O)[O-]").unwrap(), 17.07 + 23.06);
        assert_close(tpsa_of("C[N+](=O)[O-]").unwrap(), 3.01 + 17.07 + 23.06);
    }

    #[test]
    fn sulfur_and_phosphorus_are_excluded() {
        assert_close(tpsa_of("CSC").unwrap(), 0.0);
        assert_close(tpsa_of("CS(=O)(=O)C").unwrap(), 2.0 * 17.07);
    }

    #[test]
    fn unknown_environment_is_unavailable() {
        let err = tpsa_of("O").unwrap_err();
        assert_eq!(err.descriptor, "tpsa");
        assert!(tpsa_of("N").is_err());
    }
}
