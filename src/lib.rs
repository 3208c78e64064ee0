//! # infochess
//!
//! A rules engine for a hidden-information chess variant: most pieces
//! start invisible to the opponent, and a per-turn information-warfare
//! exchange lets players buy intelligence effects alongside their
//! physical moves.
//!
//! ## Design Principles
//!
//! 1. **Authoritative Core**: The engine owns the omniscient game state.
//!    Each player only ever receives a projection of it, so hidden
//!    information never leaves the server.
//!
//! 2. **Validate Before Mutate**: Every command checks turn ownership,
//!    phase legality and move legality in full before touching state.
//!    A rejected command leaves the match exactly as it was.
//!
//! 3. **Deterministic**: No randomness anywhere in the rules. The same
//!    command sequence always produces the same match, which makes
//!    replays and snapshots trivial.
//!
//! ## Architecture
//!
//! - **Fog of War**: Invisible pieces exist only in the authoritative
//!   piece map; [`Board::project`](board::Board::project) filters them
//!   out per viewer. Visibility is monotone: reveals never undo.
//!
//! - **Persistent History**: The match log uses `im::Vector`, so
//!   snapshotting a long game clones it in O(1).
//!
//! ## Modules
//!
//! - `core`: Roles, board positions, error handling
//! - `pieces`: The piece catalog and piece instances
//! - `setup`: Army building under the point budget
//! - `board`: The live board, move resolution, information warfare
//! - `engine`: The turn-phase state machine, history and snapshots

pub mod board;
pub mod core;
pub mod engine;
pub mod pieces;
pub mod setup;

// Re-export commonly used types
pub use crate::core::{Position, Role, RoleMap, RuleError, RuleResult};

pub use crate::pieces::{Piece, PieceType};

pub use crate::setup::{ArmyBuilder, MAX_POINTS};

pub use crate::board::{
    Board, CastlingMove, CastlingOptions, CostPair, IwAttack, IwBudget, IwKind, IwStrength,
    LastMove, MoveKind, MoveOutcome, PawnCapture, FEINT_COST,
};

pub use crate::engine::{
    DefenseOutcome, DefenseResult, DefenseVerdict, GameOutcome, HistoryEntry, HistoryKind,
    HistoryView, IwAttackOutcome, IwAttackRequest, IwDefenseRequest, IwReport, MatchEngine,
    MoveReport, PendingAttack, Phase, Snapshot, TurnReport, UpgradeOutcome, SNAPSHOT_VERSION,
};
