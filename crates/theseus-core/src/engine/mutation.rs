use super::progress::CancellationToken;
use crate::core::io::error::StructureError;
use crate::core::io::traits::StructureAdapter;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::ids::AtomId;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EditKind {
    Add,
    Remove,
}

/// One atom-level edit.
///
/// For `Add`, `atom_symbol` is the new atom and `locus` the position of the anchor
/// atom it was bonded to. For `Remove`, they describe the deleted atom. Positions
/// refer to the atom order of the working structure at the time of the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationOperation {
    pub kind: EditKind,
    pub atom_symbol: Element,
    pub locus: usize,
}

impl MutationOperation {
    pub fn add(element: Element, locus: usize) -> Self {
        Self {
            kind: EditKind::Add,
            atom_symbol: element,
            locus,
        }
    }

    pub fn remove(element: Element, locus: usize) -> Self {
        Self {
            kind: EditKind::Remove,
            atom_symbol: element,
            locus,
        }
    }
}

impl fmt::Display for MutationOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            EditKind::Add => "ADD",
            EditKind::Remove => "REMOVE",
        };
        write!(f, "{verb} {}@{}", self.atom_symbol, self.locus)
    }
}

/// Why a single mutation attempt produced no candidate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    #[error("mutation vocabulary is empty")]
    EmptyVocabulary,
    #[error("cannot remove the only heavy atom")]
    NothingToRemove,
    #[error("edited structure is invalid: {0}")]
    InvalidStructure(#[from] StructureError),
    #[error("edits reproduced the parent structure")]
    IdentityEdit,
}

/// Every attempt of a slot failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("mutation exhausted after {attempts} attempts")]
pub struct MutationExhausted {
    pub attempts: usize,
}

/// A validated mutated structure and the edits that produced it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub molecule: Molecule,
    pub edits: Vec<MutationOperation>,
}

/// Applies random edit sequences drawn from a vocabulary and validates the results
/// through a structure adapter.
pub struct MutationEngine<'a, A: StructureAdapter> {
    adapter: &'a A,
    vocabulary: &'a [Element],
    max_retries: usize,
    cancel: Option<&'a CancellationToken>,
}

impl<'a, A: StructureAdapter> MutationEngine<'a, A> {
    pub fn new(adapter: &'a A, vocabulary: &'a [Element], max_retries: usize) -> Self {
        Self {
            adapter,
            vocabulary,
            max_retries,
            cancel: None,
        }
    }

    /// Stops producing attempts once `token` is cancelled.
    pub fn with_cancellation(mut self, token: &'a CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    /// A lazy, bounded sequence of attempts on `parent`.
    pub fn search<'s, R: Rng>(
        &'s self,
        parent: &'s Molecule,
        edit_count: usize,
        rng: &'s mut R,
    ) -> MutationSearch<'s, 'a, A, R> {
        MutationSearch {
            engine: self,
            parent,
            edit_count,
            rng,
            attempts: 0,
        }
    }

    /// Pulls attempts until the first valid candidate or until the retry bound.
    pub fn mutate<R: Rng>(
        &self,
        parent: &Molecule,
        edit_count: usize,
        rng: &mut R,
    ) -> Result<Candidate, MutationExhausted> {
        let mut search = self.search(parent, edit_count, rng);
        for outcome in search.by_ref() {
            match outcome {
                Ok(candidate) => return Ok(candidate),
                Err(failure) => trace!(%failure, "Mutation attempt failed"),
            }
        }
        Err(MutationExhausted {
            attempts: search.attempts(),
        })
    }

    fn attempt<R: Rng>(
        &self,
        parent: &Molecule,
        edit_count: usize,
        rng: &mut R,
    ) -> Result<Candidate, AttemptFailure> {
        if self.vocabulary.is_empty() {
            return Err(AttemptFailure::EmptyVocabulary);
        }

        let mut graph = parent.graph().clone();
        let mut edits = Vec::with_capacity(edit_count);
        for _ in 0..edit_count {
            let choice = rng.gen_range(0..=self.vocabulary.len());
            let atoms: Vec<AtomId> = graph.atom_ids().collect();

            match self.vocabulary.get(choice) {
                Some(&element) => {
                    let locus = rng.gen_range(0..atoms.len().max(1));
                    let added = graph.add_atom(Atom::organic(element));
                    if let Some(&anchor) = atoms.get(locus) {
                        graph.add_bond(anchor, added, BondOrder::Single);
                    }
                    edits.push(MutationOperation::add(element, locus));
                }
                None => {
                    if atoms.len() <= 1 {
                        return Err(AttemptFailure::NothingToRemove);
                    }
                    let locus = rng.gen_range(0..atoms.len());
                    let removed = graph
                        .remove_atom(atoms[locus])
                        .ok_or(AttemptFailure::NothingToRemove)?;
                    edits.push(MutationOperation::remove(removed.element, locus));
                }
            }
        }

        graph.refresh_implicit_hydrogens();
        let text = self.adapter.render(&graph);
        let molecule = self.adapter.parse(&text)?;
        if molecule.canonical() == parent.canonical() {
            return Err(AttemptFailure::IdentityEdit);
        }
        Ok(Candidate { molecule, edits })
    }
}

/// Bounded generator of mutation attempts.
///
/// Yields at most `max_retries` outcomes, one per fresh random edit sequence, and ends
/// early when the engine's cancellation token trips.
pub struct MutationSearch<'s, 'a, A: StructureAdapter, R: Rng> {
    engine: &'s MutationEngine<'a, A>,
    parent: &'s Molecule,
    edit_count: usize,
    rng: &'s mut R,
    attempts: usize,
}

impl<A: StructureAdapter, R: Rng> MutationSearch<'_, '_, A, R> {
    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl<A: StructureAdapter, R: Rng> Iterator for MutationSearch<'_, '_, A, R> {
    type Item = Result<Candidate, AttemptFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.attempts >= self.engine.max_retries {
            return None;
        }
        if self.engine.cancel.is_some_and(CancellationToken::is_cancelled) {
            return None;
        }
        self.attempts += 1;
        Some(self.engine.attempt(self.parent, self.edit_count, &mut *self.rng))
    }
}
