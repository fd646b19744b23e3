//! # Engine Module
//!
//! The evolutionary machinery that turns one parent structure into a scored, ranked
//! population of variants.
//!
//! ## Overview
//!
//! A population run fans out over independent slots. Each slot draws an edit count,
//! pulls candidates from a bounded mutation search until one survives re-parsing,
//! then describes and scores it. Slots never share mutable state, so they run in
//! parallel under the `parallel` feature and the outcome depends only on the run seed.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Mutation vocabulary, edit range, retry bound,
//!   scoring weights and selection settings, with a validating builder
//! - **Mutation** ([`mutation`]) - Edit operations and the lazy, retry-bounded search
//! - **Population** ([`population`]) - Slot fan-out, scoring and shrinkage reporting
//! - **Ranking** ([`ranking`]) - Score ordering with the cumulative-mutation tie-break
//! - **State Tracking** ([`state`]) - Variants, generations and the evolution state
//! - **Progress Monitoring** ([`progress`]) - Progress events and cooperative cancellation
//! - **Error Handling** ([`error`]) - Engine-level error types

pub mod config;
pub mod context;
pub mod error;
pub mod mutation;
pub mod population;
pub mod progress;
pub mod ranking;
pub mod state;
