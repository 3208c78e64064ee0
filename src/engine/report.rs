//! History log and turn reports.
//!
//! Every mutating action appends a history entry. Entries describing an
//! invisible piece's move carry a generic redacted text shown to the
//! opponent; the full text is visible to the actor, and to both roles once
//! the match is over.
//!
//! The engine also accumulates the acting role's cycle (move portion plus
//! information-warfare portion) into a turn report, published when the
//! cycle completes. Redaction is a pure function over (report, viewer).

use serde::{Deserialize, Serialize};

use crate::board::{IwKind, IwStrength, MoveKind};
use crate::core::{Position, Role};
use crate::pieces::PieceType;

/// History entry category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Move,
    Capture,
    Castling,
    Upgrade,
    Iw,
    Defense,
    Game,
}

/// An append-only log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u32,
    pub kind: HistoryKind,
    /// The acting role; `None` for match-level events.
    pub actor: Option<Role>,
    /// Full text, visible to the actor and post-game to everyone.
    pub text: String,
    /// Generic text shown to the opponent while the match is live.
    pub redacted: Option<String>,
}

impl HistoryEntry {
    /// The text a viewer is allowed to see.
    #[must_use]
    pub fn visible_text(&self, viewer: Option<Role>, game_over: bool) -> &str {
        if game_over || viewer.is_none() || viewer == self.actor {
            return &self.text;
        }
        self.redacted.as_deref().unwrap_or(&self.text)
    }
}

/// A history entry as exposed to one viewer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub seq: u32,
    pub kind: HistoryKind,
    pub text: String,
}

/// The physical-move portion of a turn report.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveReport {
    /// `None` when the role's move was denied by electronic warfare.
    pub kind: Option<MoveKind>,
    pub src: Option<Position>,
    pub dest: Option<Position>,
    pub moving_piece: Option<PieceType>,
    pub captured_piece: Option<PieceType>,
    pub captured_position: Option<Position>,
    pub upgraded_to: Option<PieceType>,
    /// Whether the mover was still invisible after the move resolved.
    pub invisible: bool,
    /// Whether the move was denied by a successful electronic-warfare
    /// attack.
    pub denied: bool,
}

impl MoveReport {
    /// A "couldn't move" report for an EW-denied role.
    #[must_use]
    pub fn denied() -> Self {
        Self {
            denied: true,
            ..Self::default()
        }
    }
}

/// The information-warfare portion of a turn report. Resolved attacks are
/// public: type, strength, result and any psyop victim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwReport {
    #[serde(rename = "type")]
    pub kind: IwKind,
    pub strength: IwStrength,
    /// Whether the attack resolved at full effect.
    pub success: bool,
    pub victim_position: Option<Position>,
    pub victim_type: Option<PieceType>,
}

/// One role's completed (or accumulating) turn cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    pub role: Role,
    pub move_report: Option<MoveReport>,
    pub iw_report: Option<IwReport>,
}

impl TurnReport {
    /// An empty report for a role that has not acted yet this cycle.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            move_report: None,
            iw_report: None,
        }
    }

    /// The report as a viewer is allowed to see it: an invisible piece's
    /// quiet move or castling loses its identity, origin and destination.
    /// Captures and resolved information-warfare outcomes stay public.
    #[must_use]
    pub fn redacted_for(&self, viewer: Option<Role>) -> TurnReport {
        let hide_move = viewer.is_some()
            && viewer != Some(self.role)
            && self.move_report.as_ref().is_some_and(|m| {
                m.invisible && matches!(m.kind, Some(MoveKind::Move) | Some(MoveKind::Castling))
            });
        if !hide_move {
            return self.clone();
        }
        let mut report = self.clone();
        if let Some(move_report) = report.move_report.as_mut() {
            move_report.src = None;
            move_report.dest = None;
            move_report.moving_piece = None;
            move_report.upgraded_to = None;
            move_report.kind = Some(MoveKind::Move);
        }
        report
    }
}
