//! The single error type surfaced from every fallible engine operation.
//!
//! Commands validate fully before mutating any state: an `Err` return
//! always leaves the engine exactly as it was. The hosting transport layer
//! decides whether to surface a rejection to the offending client; it must
//! not broadcast or persist state after one.

use thiserror::Error;

use super::position::Position;
use super::role::Role;

/// Rejection reasons for engine commands.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RuleError {
    /// Catch-all for malformed or nonsensical input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A role string that is neither "white" nor "black".
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// A command issued by the role that is not currently acting.
    #[error("it is not {0}'s turn")]
    OutOfTurn(Role),

    /// A command issued during a phase that does not accept it.
    #[error("{command} is not valid during the {phase} phase")]
    WrongPhase {
        command: &'static str,
        phase: &'static str,
    },

    /// A position outside the 8x8 board.
    #[error("position {0} is off the board")]
    OutOfBounds(Position),

    /// A placement onto an occupied square during army building.
    #[error("square {0} is already occupied")]
    SquareOccupied(Position),

    /// A serialized army that does not parse or violates composition rules.
    #[error("malformed army: {0}")]
    MalformedArmy(String),

    /// A serialized army supplying a protected field with a tampered value.
    #[error("protected field in army serialization: {0}")]
    ProtectedField(&'static str),

    /// A serialized army mixing white and black pieces.
    #[error("armies may only contain pieces of a single colour")]
    MixedColours,

    /// An unknown piece type name in wire data.
    #[error("unknown piece type: {0}")]
    UnknownPieceType(String),

    /// An information-warfare attack the attacker cannot afford.
    #[error("insufficient information-warfare points: need {needed}, have {available}")]
    InsufficientIw { needed: u8, available: u8 },

    /// A move request whose geometry is illegal for the moving piece.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A snapshot that failed to serialize or deserialize.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Shorthand result alias used by every fallible operation.
pub type RuleResult<T> = Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RuleError::OutOfTurn(Role::Black);
        assert_eq!(err.to_string(), "it is not black's turn");

        let err = RuleError::WrongPhase {
            command: "move",
            phase: "setup",
        };
        assert_eq!(err.to_string(), "move is not valid during the setup phase");

        let err = RuleError::InsufficientIw {
            needed: 2,
            available: 1,
        };
        assert!(err.to_string().contains("need 2"));
    }
}
