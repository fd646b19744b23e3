use crate::core::models::graph::MolecularGraph;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use std::collections::HashMap;

pub const FINGERPRINT_BITS: usize = 2048;
pub const DEFAULT_RADIUS: usize = 2;

const WORDS: usize = FINGERPRINT_BITS / 64;
const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// A folded circular (Morgan-style) fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    words: [u64; WORDS],
}

impl Fingerprint {
    /// Fingerprint of a molecule at the default radius.
    pub fn of(molecule: &Molecule) -> Self {
        Self::circular(molecule.graph(), DEFAULT_RADIUS)
    }

    /// Hashes every atom environment up to `radius` bonds out and folds the
    /// identifiers into a fixed-width bit set.
    pub fn circular(graph: &MolecularGraph, radius: usize) -> Self {
        let mut fingerprint = Self {
            words: [0; WORDS],
        };
        let ids: Vec<AtomId> = graph.atom_ids().collect();
        let index: HashMap<AtomId, usize> =
            ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut identifiers: Vec<u64> = ids
            .iter()
            .map(|&id| {
                graph.atom(id).map_or(0, |atom| {
                    hash_words(&[
                        u64::from(atom.element.atomic_number()),
                        graph.degree(id) as u64,
                        u64::from(atom.hydrogens),
                        (i64::from(atom.charge) + 128) as u64,
                        u64::from(atom.aromatic),
                    ])
                })
            })
            .collect();
        for &identifier in &identifiers {
            fingerprint.set(identifier);
        }

        for iteration in 1..=radius {
            let next: Vec<u64> = ids
                .iter()
                .enumerate()
                .map(|(i, &id)| {
                    let mut around: Vec<(u64, u64)> = graph
                        .incident_bonds(id)
                        .filter_map(|bond| {
                            let other = bond.other(id)?;
                            Some((bond.order as u64, identifiers[index[&other]]))
                        })
                        .collect();
                    around.sort_unstable();
                    let mut words = Vec::with_capacity(2 + around.len() * 2);
                    words.push(iteration as u64);
                    words.push(identifiers[i]);
                    for (order, identifier) in around {
                        words.push(order);
                        words.push(identifier);
                    }
                    hash_words(&words)
                })
                .collect();
            for &identifier in &next {
                fingerprint.set(identifier);
            }
            identifiers = next;
        }
        fingerprint
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Tanimoto (Jaccard) similarity of the two bit sets. Two empty sets are identical.
    pub fn tanimoto(&self, other: &Self) -> f64 {
        let (mut both, mut either) = (0u32, 0u32);
        for (a, b) in self.words.iter().zip(&other.words) {
            both += (a & b).count_ones();
            either += (a | b).count_ones();
        }
        if either == 0 {
            1.0
        } else {
            f64::from(both) / f64::from(either)
        }
    }

    fn set(&mut self, identifier: u64) {
        let bit = (identifier % FINGERPRINT_BITS as u64) as usize;
        self.words[bit / 64] |= 1 << (bit % 64);
    }
}

fn hash_words(values: &[u64]) -> u64 {
    let mut hash = FNV_OFFSET;
    for value in values {
        for byte in value.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

/// Tanimoto similarity of two molecules' default fingerprints.
pub fn similarity(a: &Molecule, b: &Molecule) -> f64 {
    Fingerprint::of(a).tanimoto(&Fingerprint::of(b))
}
