use super::error::StructureError;
use crate::core::models::graph::MolecularGraph;
use crate::core::models::molecule::Molecule;

/// Reads and writes a molecular notation.
///
/// The engine only talks to structures through this trait, so an implementation backed
/// by a different toolkit can be swapped in without touching mutation or scoring.
pub trait StructureAdapter {
    /// Parses notation text into a validated molecule.
    fn parse(&self, text: &str) -> Result<Molecule, StructureError>;

    /// Returns the canonical text of a molecule. Must be idempotent:
    /// `canonicalize(parse(canonicalize(parse(x))))` equals `canonicalize(parse(x))`.
    fn canonicalize(&self, molecule: &Molecule) -> String;

    /// Writes an arbitrary working graph as notation text, without validating it.
    fn render(&self, graph: &MolecularGraph) -> String;
}
