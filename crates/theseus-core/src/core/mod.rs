//! # Core Module
//!
//! Stateless building blocks: molecular graph models, structure I/O, descriptors,
//! fingerprints and fitness scoring.
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, bonds, the mutable
//!   working graph and the immutable `Molecule` value
//! - **Structure I/O** ([`io`]) - SMILES parsing, canonical writing and the adapter trait
//! - **Descriptors** ([`descriptors`]) - Molecular weight, logP, TPSA, hydrogen-bond and
//!   rotatable-bond counts
//! - **Similarity** ([`fingerprint`]) - Circular fingerprints and Tanimoto similarity
//! - **Scoring** ([`scoring`]) - Composite fitness and the derived boolean flags

pub mod descriptors;
pub mod fingerprint;
pub mod io;
pub mod models;
pub mod scoring;
