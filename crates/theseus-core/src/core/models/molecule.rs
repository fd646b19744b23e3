use super::graph::MolecularGraph;
use std::fmt;

/// An immutable, validated molecular structure.
///
/// A `Molecule` pairs its canonical SMILES text with the graph that text parses to.
/// Values are only produced by a structure adapter after validation, and a new
/// structure always means a new `Molecule`.
#[derive(Debug, Clone)]
pub struct Molecule {
    canonical: String,
    graph: MolecularGraph,
    valid: bool,
}

impl Molecule {
    /// Wraps a graph that has already been validated and canonicalized.
    pub fn from_parts(canonical: String, graph: MolecularGraph) -> Self {
        Self {
            canonical,
            graph,
            valid: true,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn graph(&self) -> &MolecularGraph {
        &self.graph
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.graph.atom_count()
    }
}

impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Molecule {}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}
