//! # Workflows Module
//!
//! The public entry points of the library.
//!
//! ## Overview
//!
//! A [`evolve::GenerationManager`] owns one evolution run: it parses the seed, breeds
//! each generation through the engine, ranks the result and keeps the append-only
//! generation log that lineage queries read from. Callers drive it one generation at
//! a time, choosing the parent of the next round from the returned top candidates.
//!
//! ## Architecture
//!
//! - **Evolution Workflow** ([`evolve`]) - `evolve`, `continue_evolution`, `lineage`
//!   and the `VariantSummary` view handed to consumers
//! - **Seed Catalog** ([`catalog`]) - The injected disease-to-seed map
//! - **Explanations** ([`explain`]) - The explanation collaborator interface and an
//!   offline template implementation

pub mod catalog;
pub mod evolve;
pub mod explain;
