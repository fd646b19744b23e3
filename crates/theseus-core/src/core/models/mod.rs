//! # Core Models Module
//!
//! Data structures for representing small molecules.
//!
//! - [`element`] - The static element table (symbols, weights, valences)
//! - [`atom`] - A single heavy atom with charge, aromaticity and hydrogen count
//! - [`topology`] - Bonds and bond orders
//! - [`graph`] - `MolecularGraph`, the editable working structure
//! - [`molecule`] - `Molecule`, the immutable validated value
//! - [`ids`] - Slot-map key types
//!
//! ```ignore
//! use theseus::core::models::{atom::Atom, element::Element, graph::MolecularGraph};
//! use theseus::core::models::topology::BondOrder;
//!
//! let mut graph = MolecularGraph::new();
//! let c = graph.add_atom(Atom::organic(Element::C));
//! let o = graph.add_atom(Atom::organic(Element::O));
//! graph.add_bond(c, o, BondOrder::Single);
//! graph.refresh_implicit_hydrogens();
//! ```

pub mod atom;
pub mod element;
pub mod graph;
pub mod ids;
pub mod molecule;
pub mod topology;
