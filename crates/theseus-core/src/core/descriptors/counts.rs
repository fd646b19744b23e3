use super::has_double_bond_to_hetero;
use crate::core::models::element::Element;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::topology::BondOrder;
use std::collections::BTreeMap;

/// Average molecular weight, attached hydrogens included.
pub fn molecular_weight(graph: &MolecularGraph) -> f64 {
    graph.atoms_iter().map(|(_, atom)| atom.mass()).sum()
}

/// N and O atoms carrying at least one hydrogen.
pub fn hydrogen_bond_donors(graph: &MolecularGraph) -> u32 {
    graph
        .atoms_iter()
        .filter(|(_, atom)| matches!(atom.element, Element::N | Element::O) && atom.hydrogens > 0)
        .count() as u32
}

pub fn hydrogen_bond_acceptors(graph: &MolecularGraph) -> u32 {
    graph
        .atom_ids()
        .filter(|&id| is_acceptor(graph, id))
        .count() as u32
}

fn is_acceptor(graph: &MolecularGraph, id: AtomId) -> bool {
    let Some(atom) = graph.atom(id) else {
        return false;
    };
    let valence = graph.bond_order_sum(id).saturating_add(atom.hydrogens);
    match atom.element {
        Element::O | Element::S if atom.aromatic => {
            atom.charge == 0
                && !graph
                    .neighbors(id)
                    .iter()
                    .filter_map(|&n| graph.atom(n))
                    .any(|n| n.aromatic && n.element == Element::N)
        }
        Element::O | Element::S => {
            if atom.charge < 0 {
                return true;
            }
            if atom.charge > 0 || valence > 2 {
                return false;
            }
            // Acid and enol hydroxyls do not count.
            atom.hydrogens == 0
                || !graph
                    .neighbors(id)
                    .iter()
                    .any(|&n| has_double_bond_to_hetero(graph, n))
        }
        Element::N if atom.aromatic => atom.charge == 0 && atom.hydrogens == 0,
        Element::N => {
            atom.charge == 0
                && valence == 3
                && !graph.incident_bonds(id).any(|bond| {
                    bond.order == BondOrder::Single
                        && bond
                            .other(id)
                            .is_some_and(|n| has_double_bond_to_hetero(graph, n))
                })
        }
        _ => false,
    }
}

/// Acyclic single bonds between non-terminal heavy atoms, skipping bonds next to a
/// triple bond and secondary amide C-N bonds.
pub fn rotatable_bonds(graph: &MolecularGraph) -> u32 {
    let in_triple = |id: AtomId| {
        graph
            .incident_bonds(id)
            .any(|bond| bond.order == BondOrder::Triple)
    };
    graph
        .bonds()
        .iter()
        .zip(graph.ring_bonds())
        .filter(|(bond, in_ring)| {
            let (a, b) = (bond.atom1_id, bond.atom2_id);
            !in_ring
                && bond.order == BondOrder::Single
                && graph.degree(a) >= 2
                && graph.degree(b) >= 2
                && !in_triple(a)
                && !in_triple(b)
                && !is_secondary_amide(graph, a, b)
        })
        .count() as u32
}

fn is_secondary_amide(graph: &MolecularGraph, a: AtomId, b: AtomId) -> bool {
    [(a, b), (b, a)].into_iter().any(|(carbon, nitrogen)| {
        let (Some(c), Some(n)) = (graph.atom(carbon), graph.atom(nitrogen)) else {
            return false;
        };
        c.element == Element::C
            && n.element == Element::N
            && !n.aromatic
            && n.hydrogens == 1
            && graph.incident_bonds(carbon).any(|bond| {
                bond.order == BondOrder::Double
                    && bond
                        .other(carbon)
                        .and_then(|o| graph.atom(o))
                        .is_some_and(|o| o.element == Element::O)
            })
    })
}

/// Molecular formula in Hill order: C, then H, then the rest alphabetically.
pub fn hill_formula(graph: &MolecularGraph) -> String {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut hydrogens = 0u32;
    for (_, atom) in graph.atoms_iter() {
        *counts.entry(atom.element.symbol()).or_default() += 1;
        hydrogens += u32::from(atom.hydrogens);
    }
    if hydrogens > 0 {
        *counts.entry(Element::H.symbol()).or_default() += hydrogens;
    }

    let mut formula = String::new();
    let mut push = |symbol: &str, count: u32| {
        formula.push_str(symbol);
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    };
    if let Some(carbons) = counts.remove("C") {
        push("C", carbons);
        if let Some(h) = counts.remove("H") {
            push("H", h);
        }
    }
    for (symbol, count) in counts {
        push(symbol, count);
    }
    formula
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parser::{ParseOptions, parse_graph};

    fn graph(text: &str) -> MolecularGraph {
        parse_graph(text, &ParseOptions { max_fragments: 2 }).unwrap()
    }

    #[test]
    fn molecular_weight_includes_hydrogens() {
        let methane = molecular_weight(&graph("C"));
        assert!((methane - (12.011 + 4.0 * 1.008)).abs() < 1e-9);
    }

    #[test]
    fn donors_count_atoms_not_hydrogens() {
        assert_eq!(hydrogen_bond_donors(&graph("CN")), 1);
        assert_eq!(hydrogen_bond_donors(&graph("OCCO")), 2);
        assert_eq!(hydrogen_bond_donors(&graph("CSC")), 0);
    }

    #[test]
    fn acceptors_follow_the_functional_group_rules() {
        // Carboxylic acid: carbonyl O counts, acid OH does not.
        assert_eq!(hydrogen_bond_acceptors(&graph("CC(=O)O")), 1);
        // Amide N is excluded, amine N is not.
        assert_eq!(hydrogen_bond_acceptors(&graph("CC(=O)NC")), 1);
        assert_eq!(hydrogen_bond_acceptors(&graph("CCN(C)C")), 1);
        // Pyridine n counts, pyrrole nH does not.
        assert_eq!(hydrogen_bond_acceptors(&graph("c1ccncc1")), 1);
        assert_eq!(hydrogen_bond_acceptors(&graph("c1cc[nH]c1")), 0);
        // Furan o counts; isoxazole o sits next to aromatic n and does not.
        assert_eq!(hydrogen_bond_acceptors(&graph("c1ccoc1")), 1);
        assert_eq!(hydrogen_bond_acceptors(&graph("c1cnoc1")), 1);
        // Sulfone S is hypervalent; its oxygens count.
        assert_eq!(hydrogen_bond_acceptors(&graph("CS(=O)(=O)C")), 2);
        assert_eq!(hydrogen_bond_acceptors(&graph("CC(=O)[O-]")), 2);
    }

    #[test]
    fn rotatable_bonds_skip_terminal_ring_and_amide_bonds() {
        assert_eq!(rotatable_bonds(&graph("CC")), 0);
        assert_eq!(rotatable_bonds(&graph("CCCC")), 1);
        assert_eq!(rotatable_bonds(&graph("C1CCCCC1")), 0);
        assert_eq!(rotatable_bonds(&graph("CC(=O)NC")), 0);
        assert_eq!(rotatable_bonds(&graph("CC(=O)N(C)C")), 1);
        assert_eq!(rotatable_bonds(&graph("CC#CC")), 0);
        assert_eq!(rotatable_bonds(&graph("c1ccccc1-c1ccccc1")), 1);
    }

    #[test]
    fn hill_formula_orders_carbon_then_hydrogen_then_alphabetical() {
        assert_eq!(hill_formula(&graph("CCO")), "C2H6O");
        assert_eq!(hill_formula(&graph("ClC(Cl)Cl")), "CHCl3");
        assert_eq!(hill_formula(&graph("[Na+].[Cl-]")), "ClNa");
        assert_eq!(hill_formula(&graph("N")), "H3N");
    }
}
