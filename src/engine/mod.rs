//! The match engine: turn-phase state machine, history and turn reports,
//! and per-role snapshot projection.

pub mod engine;
pub mod phase;
pub mod report;
pub mod snapshot;

pub use engine::{
    DefenseOutcome, DefenseResult, DefenseVerdict, GameOutcome, IwAttackOutcome,
    IwAttackRequest, IwDefenseRequest, MatchEngine, UpgradeOutcome,
};
pub use phase::Phase;
pub use report::{HistoryEntry, HistoryKind, HistoryView, IwReport, MoveReport, TurnReport};
pub use snapshot::{PendingAttack, Snapshot, SNAPSHOT_VERSION};
