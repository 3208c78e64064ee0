//! The live game board: piece map, fog-of-war projection, move generation
//! and resolution, and the information-warfare economy.

pub mod board;
pub mod iw;
pub mod movegen;
pub mod resolve;

pub use board::{Board, LastMove};
pub use iw::{CostPair, IwAttack, IwBudget, IwKind, IwStrength, FEINT_COST};
pub use movegen::{CastlingMove, CastlingOptions, PawnCapture};
pub use resolve::{MoveKind, MoveOutcome};
