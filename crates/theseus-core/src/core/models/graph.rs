use super::atom::Atom;
use super::ids::AtomId;
use super::topology::{Bond, BondOrder};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashSet, VecDeque};

/// An editable molecular graph of heavy atoms.
///
/// Atoms live in a slot map so that removing one never invalidates the handles of the
/// others, which is what lets a sequence of add/remove edits be applied to the same
/// working structure. Bonds are stored in a flat list with a cached adjacency list.
#[derive(Debug, Clone, Default)]
pub struct MolecularGraph {
    /// Primary atom storage.
    atoms: SlotMap<AtomId, Atom>,
    /// All bonds in the graph, in insertion order.
    bonds: Vec<Bond>,
    /// Neighbour lists indexed by atom ID.
    adjacency: SecondaryMap<AtomId, Vec<AtomId>>,
}

impl MolecularGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an atom and returns its handle.
    pub fn add_atom(&mut self, atom: Atom) -> AtomId {
        let id = self.atoms.insert(atom);
        self.adjacency.insert(id, Vec::new());
        id
    }

    /// Removes an atom together with every bond that touches it.
    ///
    /// # Return
    ///
    /// Returns the removed atom, or `None` if the ID was not present.
    pub fn remove_atom(&mut self, id: AtomId) -> Option<Atom> {
        let atom = self.atoms.remove(id)?;
        self.bonds.retain(|bond| !bond.contains(id));
        if let Some(neighbors) = self.adjacency.remove(id) {
            for neighbor in neighbors {
                if let Some(list) = self.adjacency.get_mut(neighbor) {
                    list.retain(|&other| other != id);
                }
            }
        }
        Some(atom)
    }

    /// Connects two atoms.
    ///
    /// # Return
    ///
    /// Returns `false` without modifying the graph when either atom is missing, when
    /// both IDs are the same, or when the atoms are already bonded.
    pub fn add_bond(&mut self, a: AtomId, b: AtomId, order: BondOrder) -> bool {
        if a == b
            || !self.atoms.contains_key(a)
            || !self.atoms.contains_key(b)
            || self.bond_between(a, b).is_some()
        {
            return false;
        }
        self.bonds.push(Bond::new(a, b, order));
        if let Some(list) = self.adjacency.get_mut(a) {
            list.push(b);
        }
        if let Some(list) = self.adjacency.get_mut(b) {
            list.push(a);
        }
        true
    }

    pub fn set_bond_order(&mut self, bond_index: usize, order: BondOrder) {
        if let Some(bond) = self.bonds.get_mut(bond_index) {
            bond.order = order;
        }
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn atom_mut(&mut self, id: AtomId) -> Option<&mut Atom> {
        self.atoms.get_mut(id)
    }

    pub fn atoms_iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms.iter()
    }

    pub fn atom_ids(&self) -> impl Iterator<Item = AtomId> + '_ {
        self.atoms.keys()
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn neighbors(&self, id: AtomId) -> &[AtomId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, id: AtomId) -> usize {
        self.neighbors(id).len()
    }

    pub fn bond_between(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        self.bonds
            .iter()
            .find(|bond| bond.contains(a) && bond.contains(b) && a != b)
    }

    pub fn incident_bonds(&self, id: AtomId) -> impl Iterator<Item = &Bond> {
        self.bonds.iter().filter(move |bond| bond.contains(id))
    }

    /// Sum of bond valence contributions around an atom, hydrogens excluded.
    pub fn bond_order_sum(&self, id: AtomId) -> u8 {
        self.incident_bonds(id)
            .map(|bond| bond.order.valence_contribution())
            .fold(0u8, u8::saturating_add)
    }

    /// Recomputes the hydrogen count of every unbracketed atom from its current bonds.
    pub fn refresh_implicit_hydrogens(&mut self) {
        let updates: Vec<(AtomId, u8)> = self
            .atoms
            .iter()
            .filter(|(_, atom)| !atom.bracket)
            .map(|(id, atom)| {
                let sum = self.bond_order_sum(id);
                (id, atom.element.implicit_hydrogens(sum, atom.aromatic))
            })
            .collect();
        for (id, hydrogens) in updates {
            if let Some(atom) = self.atoms.get_mut(id) {
                atom.hydrogens = hydrogens;
            }
        }
    }

    /// Connected components, each listed in breadth-first order.
    pub fn fragments(&self) -> Vec<Vec<AtomId>> {
        let mut seen: HashSet<AtomId> = HashSet::with_capacity(self.atoms.len());
        let mut fragments = Vec::new();
        for start in self.atoms.keys() {
            if !seen.insert(start) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            while let Some(current) = queue.pop_front() {
                component.push(current);
                for &next in self.neighbors(current) {
                    if seen.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
            fragments.push(component);
        }
        fragments
    }

    /// Number of independent rings (bonds - atoms + components).
    pub fn cyclomatic_number(&self) -> usize {
        (self.bonds.len() + self.fragments().len()).saturating_sub(self.atoms.len())
    }

    /// Flags every bond that lies on a ring, aligned with [`Self::bonds`].
    ///
    /// A bond is a ring bond exactly when it is not a bridge of the graph.
    pub fn ring_bonds(&self) -> Vec<bool> {
        let mut search = BridgeSearch::new(self);
        for id in self.atoms.keys() {
            if search.discovery[search.index[id]] == usize::MAX {
                search.visit(id, None);
            }
        }
        self.bonds
            .iter()
            .map(|bond| {
                let key = ordered_pair(search.index[bond.atom1_id], search.index[bond.atom2_id]);
                !search.bridges.contains(&key)
            })
            .collect()
    }

    /// Atoms that belong to at least one ring.
    pub fn ring_atoms(&self) -> HashSet<AtomId> {
        self.bonds
            .iter()
            .zip(self.ring_bonds())
            .filter(|(_, in_ring)| *in_ring)
            .flat_map(|(bond, _)| [bond.atom1_id, bond.atom2_id])
            .collect()
    }
}

fn ordered_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

struct BridgeSearch<'a> {
    graph: &'a MolecularGraph,
    index: SecondaryMap<AtomId, usize>,
    discovery: Vec<usize>,
    low: Vec<usize>,
    timer: usize,
    bridges: HashSet<(usize, usize)>,
}

impl<'a> BridgeSearch<'a> {
    fn new(graph: &'a MolecularGraph) -> Self {
        let mut index = SecondaryMap::with_capacity(graph.atom_count());
        for (i, id) in graph.atoms.keys().enumerate() {
            index.insert(id, i);
        }
        let n = graph.atom_count();
        Self {
            graph,
            index,
            discovery: vec![usize::MAX; n],
            low: vec![0; n],
            timer: 0,
            bridges: HashSet::new(),
        }
    }

    fn visit(&mut self, atom: AtomId, parent: Option<AtomId>) {
        let u = self.index[atom];
        self.discovery[u] = self.timer;
        self.low[u] = self.timer;
        self.timer += 1;

        for &next in self.graph.neighbors(atom) {
            if Some(next) == parent {
                continue;
            }
            let v = self.index[next];
            if self.discovery[v] == usize::MAX {
                self.visit(next, Some(atom));
                self.low[u] = self.low[u].min(self.low[v]);
                if self.low[v] > self.discovery[u] {
                    self.bridges.insert(ordered_pair(u, v));
                }
            } else {
                self.low[u] = self.low[u].min(self.discovery[v]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::element::Element;

    fn chain(graph: &mut MolecularGraph, n: usize) -> Vec<AtomId> {
        let ids: Vec<AtomId> = (0..n)
            .map(|_| graph.add_atom(Atom::organic(Element::C)))
            .collect();
        for pair in ids.windows(2) {
            assert!(graph.add_bond(pair[0], pair[1], BondOrder::Single));
        }
        ids
    }

    #[test]
    fn add_bond_rejects_duplicates_and_self_loops() {
        let mut graph = MolecularGraph::new();
        let ids = chain(&mut graph, 2);
        assert!(!graph.add_bond(ids[0], ids[1], BondOrder::Double));
        assert!(!graph.add_bond(ids[0], ids[0], BondOrder::Single));
        assert_eq!(graph.bond_count(), 1);
    }

    #[test]
    fn remove_atom_drops_incident_bonds_and_adjacency() {
        let mut graph = MolecularGraph::new();
        let ids = chain(&mut graph, 3);
        let removed = graph.remove_atom(ids[1]).unwrap();
        assert_eq!(removed.element, Element::C);
        assert_eq!(graph.atom_count(), 2);
        assert_eq!(graph.bond_count(), 0);
        assert!(graph.neighbors(ids[0]).is_empty());
        assert!(graph.neighbors(ids[2]).is_empty());
        assert_eq!(graph.fragments().len(), 2);
        assert!(graph.remove_atom(ids[1]).is_none());
    }

    #[test]
    fn refresh_implicit_hydrogens_skips_bracket_atoms() {
        let mut graph = MolecularGraph::new();
        let c = graph.add_atom(Atom::organic(Element::C));
        let n = graph.add_atom(Atom::bracket(Element::N, 3, 1));
        graph.add_bond(c, n, BondOrder::Single);
        graph.refresh_implicit_hydrogens();
        assert_eq!(graph.atom(c).unwrap().hydrogens, 3);
        assert_eq!(graph.atom(n).unwrap().hydrogens, 3);
    }

    #[test]
    fn ring_bonds_distinguish_ring_from_chain() {
        let mut graph = MolecularGraph::new();
        let ring = chain(&mut graph, 6);
        graph.add_bond(ring[5], ring[0], BondOrder::Single);
        let tail = graph.add_atom(Atom::organic(Element::O));
        graph.add_bond(ring[0], tail, BondOrder::Single);

        let flags = graph.ring_bonds();
        assert_eq!(flags.iter().filter(|f| **f).count(), 6);
        assert!(!flags[graph.bond_count() - 1]);

        let ring_atoms = graph.ring_atoms();
        assert_eq!(ring_atoms.len(), 6);
        assert!(!ring_atoms.contains(&tail));
        assert_eq!(graph.cyclomatic_number(), 1);
    }

    #[test]
    fn two_rings_joined_by_a_bridge_count_separately() {
        let mut graph = MolecularGraph::new();
        let first = chain(&mut graph, 3);
        graph.add_bond(first[2], first[0], BondOrder::Single);
        let second = chain(&mut graph, 3);
        graph.add_bond(second[2], second[0], BondOrder::Single);
        graph.add_bond(first[0], second[0], BondOrder::Single);

        let flags = graph.ring_bonds();
        assert_eq!(flags.iter().filter(|f| !**f).count(), 1);
        assert_eq!(graph.cyclomatic_number(), 2);
        assert_eq!(graph.fragments().len(), 1);
    }

    #[test]
    fn bond_order_sum_counts_multiple_bonds() {
        let mut graph = MolecularGraph::new();
        let c = graph.add_atom(Atom::organic(Element::C));
        let o = graph.add_atom(Atom::organic(Element::O));
        let n = graph.add_atom(Atom::organic(Element::N));
        graph.add_bond(c, o, BondOrder::Double);
        graph.add_bond(c, n, BondOrder::Single);
        assert_eq!(graph.bond_order_sum(c), 3);
        assert_eq!(graph.degree(c), 2);
    }
}
