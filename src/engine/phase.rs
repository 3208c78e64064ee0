//! Turn phases.
//!
//! A full cycle for the acting role runs
//! `MOVE (⇄ PAWNCAPTURE) (→ PAWNUPGRADE) → IW`, after which either the
//! turn ends or an attack sends the opponent to `DEFENSE`. A successful
//! electronic-warfare attack skips the defender's `MOVE` entirely,
//! dropping them straight into their own `IW` phase. `GAMEOVER` is
//! terminal.

use serde::{Deserialize, Serialize};

/// The phase the match is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "setup")]
    Setup,
    #[serde(rename = "move")]
    Move,
    #[serde(rename = "pawn-capture")]
    PawnCapture,
    #[serde(rename = "pawn-upgrade")]
    PawnUpgrade,
    #[serde(rename = "iw")]
    Iw,
    #[serde(rename = "defense")]
    Defense,
    #[serde(rename = "gameover")]
    GameOver,
}

impl Phase {
    /// The phase's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Move => "move",
            Phase::PawnCapture => "pawn-capture",
            Phase::PawnUpgrade => "pawn-upgrade",
            Phase::Iw => "iw",
            Phase::Defense => "defense",
            Phase::GameOver => "gameover",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
