use super::element::{Element, HYDROGEN_MASS};

/// Represents a heavy atom in a molecular graph.
///
/// Hydrogens are never stored as atoms; they are folded into the `hydrogens` count of
/// the heavy atom they are attached to. Atoms read from a bracket expression keep the
/// hydrogen count that was written, while unbracketed atoms have it recomputed from
/// their default valence whenever the surrounding bonds change.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The chemical element.
    pub element: Element,
    /// Whether the atom is part of an aromatic system (written in lowercase).
    pub aromatic: bool,
    /// Formal charge in elementary charge units.
    pub charge: i8,
    /// Explicit mass number, if one was written.
    pub isotope: Option<u16>,
    /// Number of attached hydrogens, implicit or explicit.
    pub hydrogens: u8,
    /// Whether the hydrogen count is fixed (bracket atom) rather than derived.
    pub bracket: bool,
}

impl Atom {
    /// Creates an unbracketed, uncharged, non-aromatic atom.
    ///
    /// The hydrogen count starts at zero and is filled in by
    /// [`MolecularGraph::refresh_implicit_hydrogens`](super::graph::MolecularGraph::refresh_implicit_hydrogens).
    pub fn organic(element: Element) -> Self {
        Self {
            element,
            aromatic: false,
            charge: 0,
            isotope: None,
            hydrogens: 0,
            bracket: false,
        }
    }

    /// Creates an unbracketed aromatic atom.
    pub fn aromatic(element: Element) -> Self {
        Self {
            aromatic: true,
            ..Self::organic(element)
        }
    }

    /// Creates a bracket atom with a fixed hydrogen count and charge.
    pub fn bracket(element: Element, hydrogens: u8, charge: i8) -> Self {
        Self {
            element,
            aromatic: false,
            charge,
            isotope: None,
            hydrogens,
            bracket: true,
        }
    }

    pub fn with_aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn with_isotope(mut self, isotope: Option<u16>) -> Self {
        self.isotope = isotope;
        self
    }

    /// Returns the symbol as it appears in SMILES (lowercase when aromatic).
    pub fn smiles_symbol(&self) -> String {
        if self.aromatic {
            self.element.symbol().to_lowercase()
        } else {
            self.element.symbol().to_string()
        }
    }

    /// Mass of the atom including its attached hydrogens.
    pub fn mass(&self) -> f64 {
        self.element.atomic_weight() + f64::from(self.hydrogens) * HYDROGEN_MASS
    }

    /// Whether this atom can be written without brackets given its neighbourhood.
    pub fn fits_organic_subset(&self, bond_order_sum: u8) -> bool {
        self.element.is_organic_subset()
            && self.charge == 0
            && self.isotope.is_none()
            && (!self.aromatic || self.element.can_be_aromatic())
            && self.hydrogens == self.element.implicit_hydrogens(bond_order_sum, self.aromatic)
    }
}
