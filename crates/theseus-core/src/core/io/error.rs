use thiserror::Error;

/// Why a structure was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StructureErrorKind {
    #[error("input is empty")]
    Empty,
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },
    #[error("unknown element '{symbol}' at position {position}")]
    UnknownElement { symbol: String, position: usize },
    #[error("bond symbol at position {position} is not between two atoms")]
    DanglingBond { position: usize },
    #[error("bracket atom opened at position {position} is not terminated")]
    UnterminatedBracket { position: usize },
    #[error("unbalanced branch at position {position}")]
    UnbalancedBranch { position: usize },
    #[error("ring closure {label} is never closed")]
    UnclosedRing { label: u16 },
    #[error("ring closure {label} joins an atom to itself or duplicates a bond")]
    InvalidRingClosure { label: u16 },
    #[error("ring closure {label} has conflicting bond symbols")]
    ConflictingRingBond { label: u16 },
    #[error("atom {atom} ({symbol}) has valence {valence}, more than the allowed {max}")]
    ImpossibleValence {
        atom: usize,
        symbol: String,
        valence: u8,
        max: u8,
    },
    #[error("aromatic atom {atom} ({symbol}) is not part of a ring")]
    AromaticOutsideRing { atom: usize, symbol: String },
    #[error("structure has {found} disconnected fragments, at most {allowed} allowed")]
    TooManyFragments { found: usize, allowed: usize },
    #[error("structure contains a fragment made only of hydrogen")]
    HydrogenOnly,
}

/// A molecular notation string could not be interpreted as a coherent structure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid structure '{input}': {kind}")]
pub struct StructureError {
    pub input: String,
    pub kind: StructureErrorKind,
}

impl StructureError {
    pub fn new(input: &str, kind: StructureErrorKind) -> Self {
        Self {
            input: input.to_string(),
            kind,
        }
    }
}
