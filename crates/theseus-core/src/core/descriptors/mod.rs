//! Molecular descriptors computed directly from the heavy-atom graph.
//!
//! Every value is a pure function of the structure. Descriptors that cannot be
//! computed for an otherwise valid structure are reported as `None` and the reason is
//! logged; the rest of the record is still filled in.

pub mod counts;
pub mod logp;
pub mod tpsa;

use crate::core::models::element::Element;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

/// Number of descriptors that feed the fitness confidence.
pub const SCORED_DESCRIPTOR_COUNT: usize = 6;

/// The fixed descriptor record of one molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptors {
    pub molecular_weight: f64,
    pub logp: Option<f64>,
    pub tpsa: Option<f64>,
    pub hbd: u32,
    pub hba: u32,
    pub rotatable_bonds: u32,
    pub heavy_atom_count: u32,
    pub ring_count: u32,
    pub formula: String,
}

impl Descriptors {
    /// How many of the six scored descriptors (MW, LogP, TPSA, HBD, HBA, rotatable
    /// bonds) are available.
    pub fn available_count(&self) -> usize {
        4 + usize::from(self.logp.is_some()) + usize::from(self.tpsa.is_some())
    }
}

/// A descriptor that could not be computed for a valid structure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{descriptor} unavailable: {reason}")]
pub struct DescriptorUnavailable {
    pub descriptor: &'static str,
    pub reason: String,
}

impl DescriptorUnavailable {
    pub(crate) fn new(descriptor: &'static str, reason: impl Into<String>) -> Self {
        Self {
            descriptor,
            reason: reason.into(),
        }
    }
}

#[instrument(level = "debug", skip_all, name = "describe")]
pub fn describe(molecule: &Molecule) -> Descriptors {
    describe_graph(molecule.graph())
}

/// Computes the descriptor record of a working graph.
pub fn describe_graph(graph: &MolecularGraph) -> Descriptors {
    Descriptors {
        molecular_weight: counts::molecular_weight(graph),
        logp: available(logp::logp(graph)),
        tpsa: available(tpsa::tpsa(graph)),
        hbd: counts::hydrogen_bond_donors(graph),
        hba: counts::hydrogen_bond_acceptors(graph),
        rotatable_bonds: counts::rotatable_bonds(graph),
        heavy_atom_count: graph.atom_count() as u32,
        ring_count: graph.cyclomatic_number() as u32,
        formula: counts::hill_formula(graph),
    }
}

fn available(result: Result<f64, DescriptorUnavailable>) -> Option<f64> {
    match result {
        Ok(value) => Some(value),
        Err(unavailable) => {
            debug!(
                descriptor = unavailable.descriptor,
                reason = %unavailable.reason,
                "Descriptor fell back to its sentinel"
            );
            None
        }
    }
}

/// Bond-order tally around one atom, counting heavy neighbours only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BondTally {
    pub single: u8,
    pub double: u8,
    pub triple: u8,
    pub aromatic: u8,
}

impl BondTally {
    pub fn of(graph: &MolecularGraph, id: AtomId) -> Self {
        let mut tally = Self::default();
        for bond in graph.incident_bonds(id) {
            match bond.order {
                BondOrder::Single => tally.single += 1,
                BondOrder::Double => tally.double += 1,
                BondOrder::Triple => tally.triple += 1,
                BondOrder::Aromatic => tally.aromatic += 1,
            }
        }
        tally
    }
}

/// Whether `id` carries a double bond to an O, N, P or S atom.
pub(crate) fn has_double_bond_to_hetero(graph: &MolecularGraph, id: AtomId) -> bool {
    graph.incident_bonds(id).any(|bond| {
        bond.order == BondOrder::Double
            && bond
                .other(id)
                .and_then(|other| graph.atom(other))
                .is_some_and(|atom| {
                    matches!(atom.element, Element::O | Element::N | Element::P | Element::S)
                })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::SmilesAdapter;
    use crate::core::io::traits::StructureAdapter;

    fn describe_smiles(text: &str) -> Descriptors {
        describe(&SmilesAdapter::new(2).parse(text).unwrap())
    }

    #[test]
    fn paracetamol_reference_values() {
        let d = describe_smiles("CC(=O)Nc1ccc(O)cc1");
        assert!((d.molecular_weight - 151.16).abs() < 0.01, "{}", d.molecular_weight);
        assert!((d.tpsa.unwrap() - 49.33).abs() < 0.01);
        assert_eq!(d.hbd, 2);
        assert_eq!(d.hba, 2);
        assert_eq!(d.rotatable_bonds, 1);
        assert_eq!(d.heavy_atom_count, 11);
        assert_eq!(d.ring_count, 1);
        assert_eq!(d.formula, "C8H9NO2");
    }

    #[test]
    fn aspirin_reference_values() {
        let d = describe_smiles("CC(=O)Oc1ccccc1C(=O)O");
        assert!((d.molecular_weight - 180.16).abs() < 0.01, "{}", d.molecular_weight);
        assert!((d.tpsa.unwrap() - 63.6).abs() < 0.01);
        assert_eq!(d.hbd, 1);
        assert_eq!(d.hba, 3);
        assert_eq!(d.rotatable_bonds, 3);
        assert_eq!(d.formula, "C9H8O4");
        let logp = d.logp.unwrap();
        assert!(logp > 0.0 && logp < 2.0, "{logp}");
    }

    #[test]
    fn description_is_deterministic() {
        assert_eq!(
            describe_smiles("CC(=O)Nc1ccc(O)cc1"),
            describe_smiles("Oc1ccc(NC(C)=O)cc1")
        );
    }

    #[test]
    fn unsupported_elements_fall_back_without_aborting() {
        let d = describe_smiles("C[Si](C)(C)C");
        assert_eq!(d.logp, None);
        assert_eq!(d.tpsa, Some(0.0));
        assert_eq!(d.available_count(), 5);
        assert!(d.molecular_weight > 88.0);
    }

    #[test]
    fn bond_tally_counts_each_order() {
        let graph = crate::core::io::smiles::parser::parse_graph(
            "C=C(C#N)c1ccccc1",
            &Default::default(),
        )
        .unwrap();
        let (center, _) = graph
            .atoms_iter()
            .find(|(id, _)| graph.degree(*id) == 3 && !graph.atom(*id).unwrap().aromatic)
            .unwrap();
        let tally = BondTally::of(&graph, center);
        assert_eq!(tally.double, 1);
        assert_eq!(tally.single, 2);
        assert_eq!(tally.triple, 0);
    }
}
