//! The setup-phase board a player assembles an army on.
//!
//! An army is a single-colour set of pieces placed on the owner's first two
//! ranks under a 10-point budget, plus the owner's information-warfare
//! point split. Placement rules are validated incrementally; the army is
//! frozen and merged into the live board once both players commit.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "pieces": { "4,0": { "type": "king", "colour": "white", ... } },
//!   "ew_points": 5
//! }
//! ```
//!
//! Catalog attributes (`cost`, `limit`, `starting_rank`, `invisible`) are
//! included when serializing and validated against the catalog when
//! deserializing; a `max_points` field is rejected outright.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{Position, Role, RuleError, RuleResult};
use crate::pieces::{Piece, PieceType};

/// The army point budget.
pub const MAX_POINTS: u8 = 10;

/// Default information-warfare split: half the pool to electronic warfare.
const DEFAULT_EW_POINTS: u8 = 5;

/// A setup-phase army under construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ArmyBuilder {
    colour: Role,
    pieces: FxHashMap<Position, Piece>,
    ew_points: u8,
}

impl ArmyBuilder {
    /// Create an empty army for the given side.
    #[must_use]
    pub fn new(colour: Role) -> Self {
        Self {
            colour,
            pieces: FxHashMap::default(),
            ew_points: DEFAULT_EW_POINTS,
        }
    }

    /// The army's side.
    #[must_use]
    pub fn colour(&self) -> Role {
        self.colour
    }

    /// The placed pieces.
    #[must_use]
    pub fn pieces(&self) -> &FxHashMap<Position, Piece> {
        &self.pieces
    }

    /// Total point cost of the placed pieces.
    #[must_use]
    pub fn points(&self) -> u8 {
        self.pieces.values().map(Piece::cost).sum()
    }

    /// Points left in the budget.
    #[must_use]
    pub fn remaining_points(&self) -> u8 {
        MAX_POINTS - self.points()
    }

    /// Number of placed pieces of a type.
    #[must_use]
    pub fn count(&self, kind: PieceType) -> u8 {
        self.pieces.values().filter(|p| p.kind == kind).count() as u8
    }

    /// The piece at a square, if any.
    #[must_use]
    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.pieces.get(&pos)
    }

    /// The electronic-warfare share of the information-warfare pool.
    #[must_use]
    pub fn ew_points(&self) -> u8 {
        self.ew_points
    }

    /// Set the electronic-warfare share of the information-warfare pool.
    /// The psyop share is the complement.
    pub fn set_ew_points(&mut self, points: u8) -> RuleResult<()> {
        if points > MAX_POINTS {
            return Err(RuleError::InvalidInput(format!(
                "ew_points must be at most {MAX_POINTS}, got {points}"
            )));
        }
        self.ew_points = points;
        Ok(())
    }

    /// Whether a piece of `kind` may be placed at `pos`.
    ///
    /// Errors if `pos` is off the board. Returns false when the square is
    /// occupied, the type's count limit or the point budget would be
    /// exceeded, a second bishop would share the first bishop's square
    /// colour, or `pos` is not on the type's starting rank.
    pub fn can_place(&self, kind: PieceType, pos: Position) -> RuleResult<bool> {
        if !pos.is_on_board() {
            return Err(RuleError::OutOfBounds(pos));
        }
        if self.pieces.contains_key(&pos) {
            return Ok(false);
        }
        if self.count(kind) + 1 > kind.limit() {
            return Ok(false);
        }
        if self.points() + kind.cost() > MAX_POINTS {
            return Ok(false);
        }
        if kind == PieceType::Bishop {
            // A second bishop must stand on the other square colour.
            let clash = self
                .pieces
                .iter()
                .any(|(p, piece)| {
                    piece.kind == PieceType::Bishop && p.square_colour() == pos.square_colour()
                });
            if clash {
                return Ok(false);
            }
        }
        let required_rank = self.colour.home_rank(kind.rank_offset());
        Ok(pos.y == required_rank)
    }

    /// Place a piece, validating placement rules first.
    pub fn place(&mut self, kind: PieceType, pos: Position) -> RuleResult<()> {
        if !self.can_place(kind, pos)? {
            if self.pieces.contains_key(&pos) {
                return Err(RuleError::SquareOccupied(pos));
            }
            return Err(RuleError::InvalidInput(format!(
                "cannot place {kind} at {pos}"
            )));
        }
        self.pieces.insert(pos, Piece::new(kind, self.colour));
        Ok(())
    }

    /// Remove the piece at a square.
    pub fn remove(&mut self, pos: Position) -> RuleResult<Piece> {
        self.pieces
            .remove(&pos)
            .ok_or_else(|| RuleError::InvalidInput(format!("no piece at {pos}")))
    }

    /// All columns on the type's required rank where placement is legal.
    #[must_use]
    pub fn possible_placements(&self, kind: PieceType) -> Vec<Position> {
        let rank = self.colour.home_rank(kind.rank_offset());
        (0..8)
            .map(|x| Position::new(x, rank))
            .filter(|&pos| self.can_place(kind, pos).unwrap_or(false))
            .collect()
    }

    /// Whether this army may be committed to a match: it must have a king.
    #[must_use]
    pub fn is_valid_army(&self) -> bool {
        self.count(PieceType::King) == 1
    }

    /// Serialize to the JSON wire format.
    #[must_use]
    pub fn to_json(&self) -> String {
        let pieces: BTreeMap<String, PieceRecord> = self
            .pieces
            .iter()
            .map(|(pos, piece)| (pos.key(), PieceRecord::from_piece(piece)))
            .collect();
        let wire = ArmyWire {
            pieces,
            ew_points: Some(self.ew_points),
            max_points: None,
        };
        serde_json::to_string(&wire).unwrap_or_default()
    }

    /// Deserialize from the JSON wire format.
    ///
    /// Rejects protected-field tampering, mixed-colour piece sets, and any
    /// piece set that violates the incremental placement rules.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        let wire: ArmyWire = serde_json::from_str(json)
            .map_err(|err| RuleError::MalformedArmy(err.to_string()))?;

        if wire.max_points.is_some() {
            return Err(RuleError::ProtectedField("max_points"));
        }
        if wire.pieces.is_empty() {
            return Err(RuleError::MalformedArmy("army contains no pieces".into()));
        }

        let mut builder: Option<ArmyBuilder> = None;
        for (key, record) in &wire.pieces {
            let pos = Position::from_key(key)?;
            record.validate()?;
            let army = builder.get_or_insert_with(|| ArmyBuilder::new(record.colour));
            if record.colour != army.colour {
                return Err(RuleError::MixedColours);
            }
            army.place(record.kind, pos)?;
        }

        let mut army =
            builder.ok_or_else(|| RuleError::MalformedArmy("army contains no pieces".into()))?;
        if let Some(points) = wire.ew_points {
            army.set_ew_points(points)?;
        }
        Ok(army)
    }
}

#[derive(Serialize, Deserialize)]
struct ArmyWire {
    pieces: BTreeMap<String, PieceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ew_points: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_points: Option<serde_json::Value>,
}

/// A piece on the wire, carrying catalog attributes for display-side use.
#[derive(Serialize, Deserialize)]
struct PieceRecord {
    #[serde(rename = "type")]
    kind: PieceType,
    colour: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cost: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limit: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    starting_rank: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    invisible: Option<bool>,
}

impl PieceRecord {
    fn from_piece(piece: &Piece) -> Self {
        Self {
            kind: piece.kind,
            colour: piece.colour,
            cost: Some(piece.cost()),
            limit: Some(piece.kind.limit()),
            starting_rank: Some(piece.starting_rank()),
            invisible: Some(piece.invisible),
        }
    }

    /// Catalog attributes supplied on the wire must match the catalog.
    fn validate(&self) -> RuleResult<()> {
        if self.cost.is_some_and(|c| c != self.kind.cost()) {
            return Err(RuleError::ProtectedField("cost"));
        }
        if self.limit.is_some_and(|l| l != self.kind.limit()) {
            return Err(RuleError::ProtectedField("limit"));
        }
        let expected_rank = self.colour.home_rank(self.kind.rank_offset());
        if self.starting_rank.is_some_and(|r| r != expected_rank) {
            return Err(RuleError::ProtectedField("starting_rank"));
        }
        if self.invisible.is_some_and(|i| i != self.kind.starts_invisible()) {
            return Err(RuleError::ProtectedField("invisible"));
        }
        Ok(())
    }
}
