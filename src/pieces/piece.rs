//! Piece instances.
//!
//! A piece is a value: its type, its colour, and its current visibility.
//! Cost, count limit and starting rank are derived from the catalog rather
//! than stored. Visibility is monotone: once a piece has been revealed it
//! can never become invisible again.

use serde::{Deserialize, Serialize};

use super::catalog::PieceType;
use crate::core::Role;

/// A piece on a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Piece type.
    #[serde(rename = "type")]
    pub kind: PieceType,

    /// Owning side.
    pub colour: Role,

    /// Whether the opponent cannot see this piece.
    pub invisible: bool,
}

impl Piece {
    /// Create a fresh piece with the catalog's base visibility.
    #[must_use]
    pub fn new(kind: PieceType, colour: Role) -> Self {
        Self {
            kind,
            colour,
            invisible: kind.starts_invisible(),
        }
    }

    /// Army-building point cost.
    #[must_use]
    pub const fn cost(&self) -> u8 {
        self.kind.cost()
    }

    /// The rank this piece must be placed on during setup,
    /// mirrored for black.
    #[must_use]
    pub const fn starting_rank(&self) -> i8 {
        self.colour.home_rank(self.kind.rank_offset())
    }

    /// Permanently reveal this piece.
    pub fn reveal(&mut self) {
        self.invisible = false;
    }
}

impl std::fmt::Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.colour, self.kind)
    }
}
