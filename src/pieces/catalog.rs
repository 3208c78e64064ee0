//! The piece catalog: per-type cost, count limit, starting rank and
//! base visibility.
//!
//! | type   | cost | limit | rank | starts invisible |
//! |--------|------|-------|------|------------------|
//! | king   | 0    | 1     | 0    | yes              |
//! | queen  | 3    | 1     | 0    | no               |
//! | rook   | 2    | 2     | 0    | no               |
//! | knight | 2    | 2     | 0    | yes              |
//! | bishop | 1    | 2     | 0    | no               |
//! | pawn   | 1    | 8     | 1    | yes              |
//!
//! Catalog attributes are functions of the type, never stored: every piece
//! instance is constructed fresh, and wire formats that carry catalog
//! fields are validated against these values on deserialization.

use serde::{Deserialize, Serialize};

use crate::core::RuleError;

/// The six piece types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    King,
    Queen,
    Rook,
    Knight,
    Bishop,
    Pawn,
}

impl PieceType {
    /// All piece types, in catalog order.
    pub const ALL: [PieceType; 6] = [
        PieceType::King,
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Pawn,
    ];

    /// Army-building point cost.
    #[must_use]
    pub const fn cost(self) -> u8 {
        match self {
            PieceType::King => 0,
            PieceType::Queen => 3,
            PieceType::Rook | PieceType::Knight => 2,
            PieceType::Bishop | PieceType::Pawn => 1,
        }
    }

    /// Maximum number of pieces of this type in an army.
    #[must_use]
    pub const fn limit(self) -> u8 {
        match self {
            PieceType::King | PieceType::Queen => 1,
            PieceType::Rook | PieceType::Knight | PieceType::Bishop => 2,
            PieceType::Pawn => 8,
        }
    }

    /// White-relative starting rank offset: 1 for pawns, 0 otherwise.
    #[must_use]
    pub const fn rank_offset(self) -> i8 {
        match self {
            PieceType::Pawn => 1,
            _ => 0,
        }
    }

    /// Whether this type begins the match invisible to the opponent.
    #[must_use]
    pub const fn starts_invisible(self) -> bool {
        matches!(self, PieceType::King | PieceType::Knight | PieceType::Pawn)
    }
}

impl std::fmt::Display for PieceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Rook => "rook",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Pawn => "pawn",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for PieceType {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "king" => Ok(PieceType::King),
            "queen" => Ok(PieceType::Queen),
            "rook" => Ok(PieceType::Rook),
            "knight" => Ok(PieceType::Knight),
            "bishop" => Ok(PieceType::Bishop),
            "pawn" => Ok(PieceType::Pawn),
            other => Err(RuleError::UnknownPieceType(other.to_string())),
        }
    }
}
