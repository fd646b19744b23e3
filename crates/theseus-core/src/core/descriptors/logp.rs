use super::{BondTally, DescriptorUnavailable};
use crate::core::models::element::Element;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use std::collections::HashSet;

const H_ON_CARBON: f64 = 0.1230;
const H_ON_HETEROATOM: f64 = -0.2677;

/// Octanol/water partition coefficient from Wildman-Crippen style atom contributions.
///
/// Atom typing is simplified to aromaticity, charge, multiple bonds, ring membership
/// and heteroatom neighbours. Elements without a contribution make the descriptor
/// unavailable.
pub fn logp(graph: &MolecularGraph) -> Result<f64, DescriptorUnavailable> {
    let ring_atoms = graph.ring_atoms();
    let mut total = 0.0;
    for id in graph.atom_ids() {
        total += heavy_contribution(graph, id, &ring_atoms)?;
        if let Some(atom) = graph.atom(id) {
            let per_hydrogen = if atom.element == Element::C {
                H_ON_CARBON
            } else {
                H_ON_HETEROATOM
            };
            total += f64::from(atom.hydrogens) * per_hydrogen;
        }
    }
    Ok(total)
}

fn heavy_contribution(
    graph: &MolecularGraph,
    id: AtomId,
    ring_atoms: &HashSet<AtomId>,
) -> Result<f64, DescriptorUnavailable> {
    let Some(atom) = graph.atom(id) else {
        return Ok(0.0);
    };
    let tally = BondTally::of(graph, id);
    let has_double = tally.double > 0;
    let has_hetero_neighbor = graph
        .neighbors(id)
        .iter()
        .filter_map(|&n| graph.atom(n))
        .any(|n| n.element != Element::C);

    let value = match atom.element {
        Element::C => {
            if atom.aromatic {
                if has_hetero_neighbor { -0.14 } else { 0.296 }
            } else if has_double {
                if has_hetero_neighbor { -0.03 } else { 0.08 }
            } else if ring_atoms.contains(&id) {
                0.1441
            } else {
                match graph.degree(id) {
                    0..=2 => 0.1441,
                    3 => 0.0,
                    _ => -0.04,
                }
            }
        }
        Element::N => {
            if atom.aromatic {
                -0.3187
            } else if atom.charge > 0 {
                -1.0190
            } else if has_double {
                -0.5262
            } else {
                -0.4458
            }
        }
        Element::O => {
            if atom.charge < 0 {
                -1.189
            } else if has_double {
                -0.3339
            } else if graph.degree(id) >= 2 {
                -0.2893
            } else {
                -0.3567
            }
        }
        Element::F => 0.4118,
        Element::P => 0.2836,
        Element::S => {
            if has_double {
                -0.1084
            } else if atom.charge != 0 {
                -0.5188
            } else {
                0.6237
            }
        }
        Element::Cl => 0.6895,
        Element::Br => 0.8813,
        Element::I => 1.050,
        other => {
            return Err(DescriptorUnavailable::new(
                "logp",
                format!("no atom contribution for element {other}"),
            ));
        }
    };
    Ok(value)
}
