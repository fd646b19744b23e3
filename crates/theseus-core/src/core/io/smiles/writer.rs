use crate::core::models::atom::Atom;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::topology::BondOrder;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Writes a graph as canonical SMILES.
///
/// Atoms are ranked by iterative refinement of their local invariants (element, degree,
/// hydrogens, charge, isotope, aromaticity) against their neighbours' ranks; remaining
/// ties are broken one at a time and refined again until every atom has a distinct
/// rank. A depth-first traversal in rank order then produces the string.
pub fn write_smiles(graph: &MolecularGraph) -> String {
    if graph.is_empty() {
        return String::new();
    }
    let indexed = IndexedGraph::new(graph);
    let ranks = indexed.canonical_ranks();
    let traversal = Traversal::build(&indexed, &ranks);
    traversal.write(&indexed, &ranks)
}

struct IndexedGraph<'a> {
    atoms: Vec<&'a Atom>,
    neighbors: Vec<Vec<(usize, BondOrder)>>,
}

impl<'a> IndexedGraph<'a> {
    fn new(graph: &'a MolecularGraph) -> Self {
        let mut index = HashMap::with_capacity(graph.atom_count());
        let mut atoms = Vec::with_capacity(graph.atom_count());
        for (i, (id, atom)) in graph.atoms_iter().enumerate() {
            index.insert(id, i);
            atoms.push(atom);
        }
        let mut neighbors = vec![Vec::new(); atoms.len()];
        for bond in graph.bonds() {
            if let (Some(&a), Some(&b)) = (index.get(&bond.atom1_id), index.get(&bond.atom2_id)) {
                neighbors[a].push((b, bond.order));
                neighbors[b].push((a, bond.order));
            }
        }
        Self { atoms, neighbors }
    }

    fn len(&self) -> usize {
        self.atoms.len()
    }

    fn bond_order_sum(&self, i: usize) -> u8 {
        self.neighbors[i]
            .iter()
            .map(|(_, order)| order.valence_contribution())
            .fold(0u8, u8::saturating_add)
    }

    fn initial_invariant(&self, i: usize) -> u64 {
        let atom = self.atoms[i];
        let degree = self.neighbors[i].len().min(0xff) as u64;
        let charge = (i64::from(atom.charge) + 128) as u64;
        let isotope = u64::from(atom.isotope.unwrap_or(0));
        (u64::from(atom.element.atomic_number()) << 48)
            | (degree << 40)
            | (u64::from(atom.hydrogens) << 32)
            | (charge << 24)
            | (isotope << 8)
            | u64::from(atom.aromatic)
    }

    fn canonical_ranks(&self) -> Vec<usize> {
        let n = self.len();
        let invariants: Vec<u64> = (0..n).map(|i| self.initial_invariant(i)).collect();
        let mut ranks = dense_ranks(&invariants);
        self.refine(&mut ranks);

        while distinct_count(&ranks) < n {
            let mut class_sizes = vec![0usize; n];
            for &rank in &ranks {
                class_sizes[rank] += 1;
            }
            let Some(tied) = class_sizes.iter().position(|&size| size > 1) else {
                break;
            };
            let Some(chosen) = (0..n).find(|&i| ranks[i] == tied) else {
                break;
            };
            let split: Vec<usize> = (0..n)
                .map(|i| ranks[i] * 2 + usize::from(i != chosen))
                .collect();
            ranks = dense_ranks(&split);
            self.refine(&mut ranks);
        }
        ranks
    }

    /// Splits rank classes by their sorted neighbour ranks until nothing changes.
    fn refine(&self, ranks: &mut Vec<usize>) {
        loop {
            let before = distinct_count(ranks);
            let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..self.len())
                .map(|i| {
                    let mut around: Vec<(usize, u8)> = self.neighbors[i]
                        .iter()
                        .map(|&(j, order)| (ranks[j], order as u8))
                        .collect();
                    around.sort_unstable();
                    (ranks[i], around)
                })
                .collect();
            *ranks = dense_ranks(&keys);
            if distinct_count(ranks) == before {
                break;
            }
        }
    }
}

fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0; keys.len()];
    let mut current = 0;
    for (position, &i) in order.iter().enumerate() {
        if position > 0 && keys[order[position - 1]] != keys[i] {
            current += 1;
        }
        ranks[i] = current;
    }
    ranks
}

fn distinct_count(ranks: &[usize]) -> usize {
    ranks.iter().collect::<HashSet<_>>().len()
}

/// Spanning forest plus ring-closure bookkeeping, computed before any text is written.
struct Traversal {
    roots: Vec<usize>,
    children: Vec<Vec<(usize, BondOrder)>>,
    ring_opens: Vec<Vec<(usize, BondOrder)>>,
    ring_closes: Vec<Vec<usize>>,
}

impl Traversal {
    fn build(graph: &IndexedGraph, ranks: &[usize]) -> Self {
        let n = graph.len();
        let mut traversal = Self {
            roots: Vec::new(),
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
        };
        let mut visited = vec![false; n];
        let mut closed: HashSet<(usize, usize)> = HashSet::new();

        let mut by_rank: Vec<usize> = (0..n).collect();
        by_rank.sort_by_key(|&i| ranks[i]);
        for start in by_rank {
            if visited[start] {
                continue;
            }
            traversal.roots.push(start);
            traversal.visit(graph, ranks, start, None, &mut visited, &mut closed);
        }
        traversal
    }

    fn visit(
        &mut self,
        graph: &IndexedGraph,
        ranks: &[usize],
        atom: usize,
        parent: Option<usize>,
        visited: &mut [bool],
        closed: &mut HashSet<(usize, usize)>,
    ) {
        visited[atom] = true;
        let mut neighbors = graph.neighbors[atom].clone();
        neighbors.sort_by_key(|&(j, _)| ranks[j]);

        for (next, order) in neighbors {
            if Some(next) == parent {
                continue;
            }
            if visited[next] {
                let key = (atom.min(next), atom.max(next));
                if closed.insert(key) {
                    // `next` is an ancestor: the ring opens there and closes here.
                    self.ring_opens[next].push((atom, order));
                    self.ring_closes[atom].push(next);
                }
            } else {
                closed.insert((atom.min(next), atom.max(next)));
                self.children[atom].push((next, order));
                self.visit(graph, ranks, next, Some(atom), visited, closed);
            }
        }
    }

    fn write(&self, graph: &IndexedGraph, ranks: &[usize]) -> String {
        let mut writer = Writer {
            graph,
            ranks,
            traversal: self,
            out: String::new(),
            free: BTreeSet::new(),
            next_label: 1,
            labels: HashMap::new(),
        };
        for (k, &root) in self.roots.iter().enumerate() {
            if k > 0 {
                writer.out.push('.');
            }
            writer.write_from(root);
        }
        writer.out
    }
}

struct Writer<'a> {
    graph: &'a IndexedGraph<'a>,
    ranks: &'a [usize],
    traversal: &'a Traversal,
    out: String,
    free: BTreeSet<u16>,
    next_label: u16,
    labels: HashMap<(usize, usize), u16>,
}

impl Writer<'_> {
    fn write_from(&mut self, atom: usize) {
        self.out.push_str(&atom_token(
            self.graph.atoms[atom],
            self.graph.bond_order_sum(atom),
        ));

        let mut closes = self.traversal.ring_closes[atom].clone();
        closes.sort_by_key(|&j| self.ranks[j]);
        for opener in closes {
            if let Some(label) = self.labels.remove(&(opener, atom)) {
                push_ring_label(&mut self.out, label);
                self.free.insert(label);
            }
        }

        let mut opens = self.traversal.ring_opens[atom].clone();
        opens.sort_by_key(|&(j, _)| self.ranks[j]);
        for (closer, order) in opens {
            let label = self.allocate_label();
            self.labels.insert((atom, closer), label);
            self.out
                .push_str(bond_token(order, self.graph.atoms[atom], self.graph.atoms[closer]));
            push_ring_label(&mut self.out, label);
        }

        let children = &self.traversal.children[atom];
        let last = children.len().saturating_sub(1);
        for (k, &(child, order)) in children.iter().enumerate() {
            let bond = bond_token(order, self.graph.atoms[atom], self.graph.atoms[child]);
            if k < last {
                self.out.push('(');
                self.out.push_str(bond);
                self.write_from(child);
                self.out.push(')');
            } else {
                self.out.push_str(bond);
                self.write_from(child);
            }
        }
    }

    fn allocate_label(&mut self) -> u16 {
        if let Some(label) = self.free.pop_first() {
            return label;
        }
        let label = self.next_label;
        self.next_label += 1;
        label
    }
}

fn push_ring_label(out: &mut String, label: u16) {
    if label < 10 {
        out.push(char::from(b'0' + label as u8));
    } else {
        out.push('%');
        out.push_str(&format!("{label:02}"));
    }
}

fn bond_token(order: BondOrder, a: &Atom, b: &Atom) -> &'static str {
    let both_aromatic = a.aromatic && b.aromatic;
    match order {
        BondOrder::Single if both_aromatic => "-",
        BondOrder::Single => "",
        BondOrder::Double => "=",
        BondOrder::Triple => "#",
        BondOrder::Aromatic if both_aromatic => "",
        BondOrder::Aromatic => ":",
    }
}

fn atom_token(atom: &Atom, bond_order_sum: u8) -> String {
    if atom.fits_organic_subset(bond_order_sum) {
        return atom.smiles_symbol();
    }
    let mut token = String::from("[");
    if let Some(isotope) = atom.isotope {
        token.push_str(&isotope.to_string());
    }
    token.push_str(&atom.smiles_symbol());
    match atom.hydrogens {
        0 => {}
        1 => token.push('H'),
        n => token.push_str(&format!("H{n}")),
    }
    match atom.charge {
        0 => {}
        1 => token.push('+'),
        -1 => token.push('-'),
        c if c > 0 => token.push_str(&format!("+{c}")),
        c => token.push_str(&format!("-{}", -i16::from(c))),
    }
    token.push(']');
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::smiles::parser::{ParseOptions, parse_graph};

    fn write(text: &str) -> String {
        let graph = parse_graph(text, &ParseOptions { max_fragments: 3 }).unwrap();
        write_smiles(&graph)
    }

    #[test]
    fn dense_ranks_assign_equal_keys_equal_ranks() {
        assert_eq!(dense_ranks(&[30, 10, 30, 20]), vec![2, 0, 2, 1]);
        assert_eq!(dense_ranks::<u8>(&[]), Vec::<usize>::new());
    }

    #[test]
    fn atom_order_does_not_change_output() {
        assert_eq!(write("CCO"), write("OCC"));
        assert_eq!(write("Oc1ccccc1"), write("c1ccccc1O"));
        assert_eq!(write("CC(=O)O"), write("OC(C)=O"));
        assert_eq!(
            write("CC(=O)Nc1ccc(O)cc1"),
            write("Oc1ccc(NC(C)=O)cc1")
        );
    }

    #[test]
    fn simple_chain_is_written_from_the_lowest_ranked_end() {
        assert_eq!(write("OCC"), "CCO");
    }

    #[test]
    fn benzene_uses_a_single_ring_label() {
        assert_eq!(write("c1ccccc1"), "c1ccccc1");
    }

    #[test]
    fn aromatic_single_bond_between_rings_is_explicit() {
        let text = write("c1ccc(cc1)c1ccccc1");
        assert!(text.contains('-'), "got {text}");
    }

    #[test]
    fn bracket_atoms_are_written_when_needed() {
        assert_eq!(write("[CH4]"), "C");
        assert_eq!(write("C[NH3+]"), "C[NH3+]");
        assert!(write("c1cc[nH]c1").contains("[nH]"));
        assert!(write("[13CH3]C").contains("[13CH3]"));
        assert!(write("CC(=O)[O-]").contains("[O-]"));
        assert!(write("[O--]").contains("[O-2]"));
    }

    #[test]
    fn fragments_are_separated_by_dots() {
        let text = write("C[NH3+].[Cl-]");
        assert_eq!(text.matches('.').count(), 1);
    }

    #[test]
    fn output_reparses_to_the_same_atom_and_bond_counts() {
        for smiles in [
            "CC(=O)Oc1ccccc1C(=O)O",
            "c1ccc2c(c1)ccc3c2cccc3",
            "C1=CC=C(C=C1)C2=CC(=NN2C3=CC=C(C=C3)S(=O)(=O)N)C(F)(F)F",
            "C12C3C4C1C5C2C3C45",
        ] {
            let original = parse_graph(smiles, &ParseOptions::default()).unwrap();
            let text = write_smiles(&original);
            let reparsed = parse_graph(&text, &ParseOptions::default()).unwrap();
            assert_eq!(original.atom_count(), reparsed.atom_count(), "{text}");
            assert_eq!(original.bond_count(), reparsed.bond_count(), "{text}");
        }
    }

    #[test]
    fn ring_labels_above_nine_use_percent_notation() {
        let mut out = String::new();
        push_ring_label(&mut out, 3);
        push_ring_label(&mut out, 12);
        assert_eq!(out, "3%12");
    }
}
