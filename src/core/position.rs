//! Board coordinates.
//!
//! Positions are (x, y) pairs on an 8x8 board, with y = 0 as white's back
//! rank and y = 7 as black's. The canonical wire key for a position is the
//! string `"x,y"`; wherever an ordering of positions is observable, the
//! lexicographic (x, y) order is used.

use serde::{Deserialize, Serialize};

use super::error::{RuleError, RuleResult};

/// A square on the 8x8 board.
///
/// Coordinates are signed so that offset arithmetic can step off the board;
/// use [`Position::is_on_board`] to filter such squares out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates lie in [0, 7].
    #[must_use]
    pub const fn is_on_board(self) -> bool {
        self.x >= 0 && self.x <= 7 && self.y >= 0 && self.y <= 7
    }

    /// The position shifted by (dx, dy). May leave the board.
    #[must_use]
    pub const fn offset(self, dx: i8, dy: i8) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Square colour parity: 0 for light squares, 1 for dark squares.
    #[must_use]
    pub const fn square_colour(self) -> u8 {
        ((self.x + self.y).rem_euclid(2)) as u8
    }

    /// The number of king steps between two squares: diagonal until one
    /// axis aligns, then straight. Equal to the Chebyshev distance.
    #[must_use]
    pub const fn king_distance(self, other: Position) -> u8 {
        let dx = (self.x - other.x).unsigned_abs();
        let dy = (self.y - other.y).unsigned_abs();
        if dx > dy {
            dx
        } else {
            dy
        }
    }

    /// The canonical `"x,y"` wire key for this position.
    #[must_use]
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parse a `"x,y"` wire key.
    pub fn from_key(key: &str) -> RuleResult<Self> {
        let mut parts = key.split(',');
        let (x, y) = match (parts.next(), parts.next(), parts.next()) {
            (Some(x), Some(y), None) => (x, y),
            _ => return Err(RuleError::InvalidInput(format!("bad position key: {key}"))),
        };
        let parse = |s: &str| {
            s.trim()
                .parse::<i8>()
                .map_err(|_| RuleError::InvalidInput(format!("bad position key: {key}")))
        };
        let pos = Position::new(parse(x)?, parse(y)?);
        if !pos.is_on_board() {
            return Err(RuleError::OutOfBounds(pos));
        }
        Ok(pos)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}
