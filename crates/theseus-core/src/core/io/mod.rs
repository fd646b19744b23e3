//! Structure input/output.
//!
//! The [`traits::StructureAdapter`] trait is the seam between the engine and whatever
//! reads molecular notation. [`smiles`] provides the built-in implementation: a parser
//! for a practical SMILES subset with chemical validation, and a canonical writer.

pub mod error;
pub mod smiles;
pub mod traits;
