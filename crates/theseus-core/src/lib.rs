//! # Theseus Core Library
//!
//! An evolutionary transformation engine for small molecules: a seed structure is
//! mutated through randomized atom-level edits, every variant is scored with
//! drug-likeness heuristics, and a human (or an automated policy) picks the parent
//! of the next generation.
//!
//! ## Architectural Philosophy
//!
//! The library keeps the same three-layer split throughout:
//!
//! - **[`core`]: The Foundation.** Stateless molecular models (`MolecularGraph`, `Molecule`),
//!   the SMILES reader/writer, descriptor calculations, fingerprints and fitness scoring.
//!   Everything here is a pure function of its input.
//!
//! - **[`engine`]: The Logic Core.** Mutation search, population generation, ranking,
//!   configuration, progress reporting and the variant/generation state types.
//!
//! - **[`workflows`]: The Public API.** The `GenerationManager` that owns the lineage and
//!   exposes `evolve`, `continue_evolution` and `lineage`, plus the injected seed catalog
//!   and explanation collaborator.

pub mod core;
pub mod engine;
pub mod workflows;
