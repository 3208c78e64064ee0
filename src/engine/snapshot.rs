//! Match snapshots: per-role projected DTOs and full persistence state.
//!
//! A snapshot taken with `view: None` is omniscient and lossless; feeding
//! it back through [`MatchEngine::from_dto`] reproduces the engine. A
//! snapshot taken for a role applies fog of war: invisible opposing
//! pieces, the opponent's remaining budget and army, a pending attack's
//! strength (a feint must look like the real thing) and move bookkeeping
//! are all withheld, and history text is pre-redacted.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::engine::{GameOutcome, MatchEngine};
use super::phase::Phase;
use super::report::{HistoryEntry, TurnReport};
use crate::board::{Board, CostPair, IwAttack, IwBudget, IwKind, IwStrength, LastMove};
use crate::core::{Position, Role, RoleMap, RuleError, RuleResult};
use crate::pieces::Piece;
use crate::setup::ArmyBuilder;

/// Snapshot wire-format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A pending information-warfare attack as seen by one viewer.
///
/// Snapshot types carry their `Option` fields explicitly rather than
/// omitting them, so the compact binary encoding stays self-consistent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    #[serde(rename = "type")]
    pub kind: IwKind,
    /// Withheld from the defender: a feint is indistinguishable from a
    /// live attack until resolution.
    pub strength: Option<IwStrength>,
    pub attacker: Role,
    pub defense_cost: u8,
}

/// A serializable view of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// The role this snapshot was projected for; `None` is omniscient.
    pub view: Option<Role>,
    pub phase: Phase,
    pub current_role: Role,
    pub winner: Option<GameOutcome>,
    /// Pieces keyed by "x,y", filtered by fog of war for role views.
    pub pieces: BTreeMap<String, Piece>,
    /// Remaining budgets; a role view carries only its own.
    pub remaining_iw: RoleMap<Option<IwBudget>>,
    pub psyop_costs: CostPair,
    pub ew_costs: CostPair,
    pub last_move: Option<LastMove>,
    pub pending_upgrade: Option<Position>,
    pub pending_attack: Option<PendingAttack>,
    pub move_denied: Option<Role>,
    /// Setup armies in their JSON wire format; a role view carries only
    /// its own.
    pub armies: RoleMap<Option<String>>,
    pub current_turn_report: Option<TurnReport>,
    pub last_turn_report: Option<TurnReport>,
    pub history: Vec<HistoryEntry>,
}

impl Snapshot {
    /// Serialize to JSON.
    pub fn to_json(&self) -> RuleResult<String> {
        serde_json::to_string(self).map_err(|err| RuleError::Serialization(err.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> RuleResult<Self> {
        serde_json::from_str(json).map_err(|err| RuleError::Serialization(err.to_string()))
    }

    /// Serialize to a compact binary form.
    pub fn to_bytes(&self) -> RuleResult<Vec<u8>> {
        bincode::serialize(self).map_err(|err| RuleError::Serialization(err.to_string()))
    }

    /// Deserialize from the compact binary form.
    pub fn from_bytes(bytes: &[u8]) -> RuleResult<Self> {
        bincode::deserialize(bytes).map_err(|err| RuleError::Serialization(err.to_string()))
    }
}

impl MatchEngine {
    /// Project the match into a snapshot for one viewer.
    #[must_use]
    pub fn as_dto(&self, viewer: Option<Role>) -> Snapshot {
        let game_over = self.phase() == Phase::GameOver;
        let omniscient = viewer.is_none() || game_over;

        let pieces: BTreeMap<String, Piece> = match (self.board(), viewer) {
            (Some(board), Some(role)) if !game_over => board
                .project(role)
                .into_iter()
                .map(|(pos, piece)| (pos.key(), piece))
                .collect(),
            (Some(board), _) => board
                .pieces()
                .iter()
                .map(|(pos, piece)| (pos.key(), *piece))
                .collect(),
            (None, _) => BTreeMap::new(),
        };

        let remaining_iw = RoleMap::new(|role| {
            if omniscient || viewer == Some(role) {
                self.board().map(|board| board.remaining_iw(role))
            } else {
                None
            }
        });

        let armies = RoleMap::new(|role| {
            if omniscient || viewer == Some(role) {
                self.army(role).map(ArmyBuilder::to_json)
            } else {
                None
            }
        });

        let pending_attack = self.pending_attack().map(|attack| PendingAttack {
            kind: attack.kind,
            strength: if omniscient || viewer == Some(attack.attacker) {
                Some(attack.strength)
            } else {
                None
            },
            attacker: attack.attacker,
            defense_cost: self
                .board()
                .map_or(0, |board| board.costs(attack.kind).defend),
        });

        let history = self
            .history_entries()
            .iter()
            .map(|entry| {
                if omniscient {
                    entry.clone()
                } else {
                    HistoryEntry {
                        seq: entry.seq,
                        kind: entry.kind,
                        actor: entry.actor,
                        text: entry.visible_text(viewer, game_over).to_string(),
                        redacted: None,
                    }
                }
            })
            .collect();

        let (psyop_costs, ew_costs) = self.board().map_or_else(
            || (CostPair::new(), CostPair::new()),
            |board| (board.costs(IwKind::Psyop), board.costs(IwKind::Ew)),
        );

        Snapshot {
            version: SNAPSHOT_VERSION,
            view: viewer,
            phase: self.phase(),
            current_role: self.current_role(),
            winner: self.winner(),
            pieces,
            remaining_iw,
            psyop_costs,
            ew_costs,
            last_move: if omniscient {
                self.board().and_then(Board::last_move)
            } else {
                None
            },
            pending_upgrade: if omniscient {
                self.board().and_then(Board::pending_upgrade)
            } else {
                None
            },
            pending_attack,
            move_denied: self.move_denied(),
            armies,
            current_turn_report: if omniscient {
                self.current_turn_report().cloned()
            } else {
                None
            },
            last_turn_report: self
                .last_turn_report()
                .map(|report| report.redacted_for(viewer)),
            history,
        }
    }

    /// Restore an engine from a snapshot.
    ///
    /// An omniscient snapshot restores losslessly. A role-projected
    /// snapshot yields the engine as that role knows it: withheld pieces,
    /// budgets and bookkeeping stay absent, so nothing the projection
    /// hid can be recovered from the reconstruction.
    pub fn from_dto(snapshot: &Snapshot) -> RuleResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(RuleError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let mut armies: RoleMap<Option<ArmyBuilder>> = RoleMap::with_default();
        for role in Role::ALL {
            if let Some(json) = snapshot.armies.get(role) {
                *armies.get_mut(role) = Some(ArmyBuilder::from_json(json)?);
            }
        }

        let board = if snapshot.phase == Phase::Setup {
            None
        } else {
            let mut pieces = FxHashMap::default();
            for (key, piece) in &snapshot.pieces {
                pieces.insert(Position::from_key(key)?, *piece);
            }
            let remaining_iw = RoleMap::new(|role| {
                (*snapshot.remaining_iw.get(role)).unwrap_or(IwBudget { psyop: 0, ew: 0 })
            });
            Some(Board::from_parts(
                pieces,
                remaining_iw,
                snapshot.psyop_costs,
                snapshot.ew_costs,
                snapshot.last_move,
                snapshot.pending_upgrade,
            ))
        };

        // A defender-view snapshot withholds the strength; the pending
        // attack is then not reconstructible and stays with the server.
        let current_iw_attack = snapshot.pending_attack.and_then(|attack| {
            attack.strength.map(|strength| IwAttack {
                attacker: attack.attacker,
                kind: attack.kind,
                strength,
            })
        });

        Ok(MatchEngine::from_parts(
            snapshot.phase,
            snapshot.current_role,
            armies,
            board,
            current_iw_attack,
            snapshot.winner,
            snapshot.move_denied,
            snapshot.history.iter().cloned().collect(),
            snapshot.current_turn_report.clone(),
            snapshot.last_turn_report.clone(),
        ))
    }
}
