use phf::{Map, phf_map};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Elements the structure reader understands.
///
/// The set covers the SMILES organic subset plus the handful of heteroatoms and
/// counter-ions that appear in drug-like bracket atoms. Variant names double as
/// the element symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Element {
    H,
    B,
    C,
    N,
    O,
    F,
    Na,
    Mg,
    Si,
    P,
    S,
    Cl,
    K,
    Ca,
    Se,
    Br,
    I,
}

static ELEMENT_SYMBOLS: Map<&'static str, Element> = phf_map! {
    "H" => Element::H,
    "B" => Element::B,
    "C" => Element::C,
    "N" => Element::N,
    "O" => Element::O,
    "F" => Element::F,
    "Na" => Element::Na,
    "Mg" => Element::Mg,
    "Si" => Element::Si,
    "P" => Element::P,
    "S" => Element::S,
    "Cl" => Element::Cl,
    "K" => Element::K,
    "Ca" => Element::Ca,
    "Se" => Element::Se,
    "Br" => Element::Br,
    "I" => Element::I,
};

// Standard atomic weights (IUPAC, conventional values).
static ATOMIC_WEIGHTS: Map<&'static str, f64> = phf_map! {
    "H" => 1.008,
    "B" => 10.81,
    "C" => 12.011,
    "N" => 14.007,
    "O" => 15.999,
    "F" => 18.998,
    "Na" => 22.990,
    "Mg" => 24.305,
    "Si" => 28.085,
    "P" => 30.974,
    "S" => 32.06,
    "Cl" => 35.45,
    "K" => 39.098,
    "Ca" => 40.078,
    "Se" => 78.971,
    "Br" => 79.904,
    "I" => 126.904,
};

pub const HYDROGEN_MASS: f64 = 1.008;

impl Element {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::H => "H",
            Self::B => "B",
            Self::C => "C",
            Self::N => "N",
            Self::O => "O",
            Self::F => "F",
            Self::Na => "Na",
            Self::Mg => "Mg",
            Self::Si => "Si",
            Self::P => "P",
            Self::S => "S",
            Self::Cl => "Cl",
            Self::K => "K",
            Self::Ca => "Ca",
            Self::Se => "Se",
            Self::Br => "Br",
            Self::I => "I",
        }
    }

    pub fn atomic_number(self) -> u8 {
        match self {
            Self::H => 1,
            Self::B => 5,
            Self::C => 6,
            Self::N => 7,
            Self::O => 8,
            Self::F => 9,
            Self::Na => 11,
            Self::Mg => 12,
            Self::Si => 14,
            Self::P => 15,
            Self::S => 16,
            Self::Cl => 17,
            Self::K => 19,
            Self::Ca => 20,
            Self::Se => 34,
            Self::Br => 35,
            Self::I => 53,
        }
    }

    pub fn atomic_weight(self) -> f64 {
        ATOMIC_WEIGHTS
            .get(self.symbol())
            .copied()
            .unwrap_or_default()
    }

    /// Looks up an element by its capitalised symbol (`"Cl"`, `"N"`).
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ELEMENT_SYMBOLS.get(symbol).copied()
    }

    /// Looks up an element written in lowercase aromatic form (`"c"`, `"se"`).
    pub fn from_aromatic_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "n" => Some(Self::N),
            "o" => Some(Self::O),
            "p" => Some(Self::P),
            "s" => Some(Self::S),
            "se" => Some(Self::Se),
            _ => None,
        }
    }

    /// Elements that may be written without brackets.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Self::B
                | Self::C
                | Self::N
                | Self::O
                | Self::P
                | Self::S
                | Self::F
                | Self::Cl
                | Self::Br
                | Self::I
        )
    }

    /// Elements that may carry the aromatic flag.
    pub fn can_be_aromatic(self) -> bool {
        matches!(
            self,
            Self::B | Self::C | Self::N | Self::O | Self::P | Self::S | Self::Se
        )
    }

    /// Unbracketed aromatic atoms of these elements spend one valence unit on the pi
    /// system when their hydrogens are derived. Chalcogens contribute a lone pair instead.
    pub fn reserves_pi_valence(self) -> bool {
        matches!(self, Self::B | Self::C | Self::N | Self::P)
    }

    /// Aromatic atoms of these elements always need a pi bond, so the pi unit counts
    /// against their valence even when written in brackets. Aromatic nitrogen and
    /// phosphorus may instead donate a lone pair (pyrrole-type), so they are exempt.
    pub fn requires_pi_valence(self) -> bool {
        matches!(self, Self::B | Self::C)
    }

    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Self::H | Self::F | Self::Cl | Self::Br | Self::I | Self::Na | Self::K => &[1],
            Self::B => &[3],
            Self::C | Self::Si => &[4],
            Self::N => &[3],
            Self::P => &[3, 5],
            Self::O => &[2],
            Self::S | Self::Se => &[2, 4, 6],
            Self::Mg | Self::Ca => &[2],
        }
    }

    /// Largest bond-order sum (hydrogens included) the element tolerates at the given
    /// formal charge.
    ///
    /// Charged atoms are checked against their lowest valence: pnictogens, chalcogens
    /// and halogens gain one unit per positive charge, boron gains one per negative
    /// charge, and carbon-group atoms and metals lose one per unit of either sign.
    pub fn max_valence(self, charge: i8) -> u8 {
        let valences = self.default_valences();
        if charge == 0 {
            return valences.iter().copied().max().unwrap_or(0);
        }
        let lowest = i16::from(valences.iter().copied().min().unwrap_or(0));
        let charge = i16::from(charge);
        let adjusted = match self {
            Self::B => lowest - charge,
            Self::N | Self::P | Self::O | Self::S | Self::Se | Self::F | Self::Cl | Self::Br
            | Self::I => lowest + charge,
            Self::H | Self::C | Self::Si | Self::Na | Self::K | Self::Mg | Self::Ca => {
                lowest - charge.abs()
            }
        };
        adjusted.clamp(0, i16::from(u8::MAX)) as u8
    }

    /// Implicit hydrogen count for an unbracketed atom with the given bond-order sum.
    pub fn implicit_hydrogens(self, bond_order_sum: u8, aromatic: bool) -> u8 {
        let valences = self.default_valences();
        if aromatic {
            if !self.reserves_pi_valence() {
                return 0;
            }
            let lowest = valences.iter().copied().min().unwrap_or(0);
            return lowest.saturating_sub(bond_order_sum + 1);
        }
        valences
            .iter()
            .find(|&&v| v >= bond_order_sum)
            .map(|&v| v - bond_order_sum)
            .unwrap_or(0)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown element symbol '{0}'")]
pub struct ParseElementError(pub String);

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::from_symbol(trimmed).ok_or_else(|| ParseElementError(trimmed.to_string()))
    }
}
