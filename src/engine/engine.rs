//! The phase state machine sequencing a match.
//!
//! The engine owns the live [`Board`] and enforces turn ownership, phase
//! legality, and the information-warfare exchange. It performs no I/O and
//! is fully synchronous: the hosting transport applies one command at a
//! time and broadcasts the per-role snapshots the engine projects.
//!
//! Every command validates fully before mutating, so a rejected command
//! leaves the match exactly as it was.

use im::Vector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::phase::Phase;
use super::report::{HistoryEntry, HistoryKind, HistoryView, IwReport, MoveReport, TurnReport};
use crate::board::{
    Board, IwAttack, IwKind, IwStrength, MoveKind, MoveOutcome, PawnCapture, FEINT_COST,
};
use crate::core::{Position, Role, RoleMap, RuleError, RuleResult};
use crate::pieces::{Piece, PieceType};
use crate::setup::ArmyBuilder;

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Winner(Role),
    Draw,
}

impl GameOutcome {
    /// Check whether a role won.
    #[must_use]
    pub fn is_winner(&self, role: Role) -> bool {
        matches!(self, GameOutcome::Winner(winner) if *winner == role)
    }
}

/// An information-warfare attack request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwAttackRequest {
    #[serde(rename = "type")]
    pub kind: IwKind,
    pub strength: IwStrength,
}

/// The attacker's view of a launched attack: what the defender would pay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwAttackOutcome {
    pub defense_cost: u8,
}

/// An information-warfare defense decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwDefenseRequest {
    pub defend: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chosen_position: Option<Position>,
}

/// Who prevailed in an information-warfare exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefenseVerdict {
    /// The defense neutralized the attack.
    Defended,
    /// The attack resolved at full effect.
    Success,
}

/// A resolved information-warfare exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseResult {
    pub attacker: Role,
    pub defender: Role,
    #[serde(rename = "type")]
    pub kind: IwKind,
    pub strength: IwStrength,
    pub result: DefenseVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_piece: Option<Piece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_position: Option<Position>,
}

/// The outcome of an `iw_defense` command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum DefenseOutcome {
    /// The psyop candidates are tied; the defender must pick the victim
    /// and repeat the command. No state was changed.
    #[serde(rename = "PSYOP_CHOOSE_VICTIM")]
    ChooseVictim { targets: Vec<Position> },
    /// The exchange resolved.
    #[serde(rename = "DEFENSE_RESULT")]
    Resolved(DefenseResult),
}

/// The outcome of a pawn upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeOutcome {
    pub pos: Position,
    pub new_type: PieceType,
}

/// The rules engine for one match.
#[derive(Clone, Debug)]
pub struct MatchEngine {
    phase: Phase,
    current_role: Role,
    armies: RoleMap<Option<ArmyBuilder>>,
    board: Option<Board>,
    current_iw_attack: Option<IwAttack>,
    winner: Option<GameOutcome>,
    move_denied: Option<Role>,
    history: Vector<HistoryEntry>,
    next_seq: u32,
    current_turn_report: Option<TurnReport>,
    last_turn_report: Option<TurnReport>,
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchEngine {
    /// Create a new match awaiting both armies.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::Setup,
            current_role: Role::White,
            armies: RoleMap::with_default(),
            board: None,
            current_iw_attack: None,
            winner: None,
            move_denied: None,
            history: Vector::new(),
            next_seq: 0,
            current_turn_report: None,
            last_turn_report: None,
        }
    }

    /// Rebuild an engine from snapshot parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        phase: Phase,
        current_role: Role,
        armies: RoleMap<Option<ArmyBuilder>>,
        board: Option<Board>,
        current_iw_attack: Option<IwAttack>,
        winner: Option<GameOutcome>,
        move_denied: Option<Role>,
        history: Vector<HistoryEntry>,
        current_turn_report: Option<TurnReport>,
        last_turn_report: Option<TurnReport>,
    ) -> Self {
        let next_seq = history.last().map_or(0, |entry| entry.seq + 1);
        Self {
            phase,
            current_role,
            armies,
            board,
            current_iw_attack,
            winner,
            move_denied,
            history,
            next_seq,
            current_turn_report,
            last_turn_report,
        }
    }

    // === Accessors ===

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The role currently expected to act.
    #[must_use]
    pub fn current_role(&self) -> Role {
        self.current_role
    }

    /// The match outcome, once decided.
    #[must_use]
    pub fn winner(&self) -> Option<GameOutcome> {
        self.winner
    }

    /// The live board, once the match has started.
    #[must_use]
    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// The pending attack awaiting defense, if any.
    #[must_use]
    pub fn pending_attack(&self) -> Option<IwAttack> {
        self.current_iw_attack
    }

    /// The role whose next physical move is denied, if any.
    #[must_use]
    pub fn move_denied(&self) -> Option<Role> {
        self.move_denied
    }

    /// A committed setup army.
    #[must_use]
    pub fn army(&self, role: Role) -> Option<&ArmyBuilder> {
        self.armies.get(role).as_ref()
    }

    /// The history as one viewer is allowed to see it. The full log is
    /// exposed to everyone once the match is over.
    #[must_use]
    pub fn history_for(&self, viewer: Option<Role>) -> Vec<HistoryView> {
        let game_over = self.phase == Phase::GameOver;
        self.history
            .iter()
            .map(|entry| HistoryView {
                seq: entry.seq,
                kind: entry.kind,
                text: entry.visible_text(viewer, game_over).to_string(),
            })
            .collect()
    }

    /// Raw history entries (persistence view).
    #[must_use]
    pub fn history_entries(&self) -> &Vector<HistoryEntry> {
        &self.history
    }

    /// The last published turn report, redacted for a viewer.
    #[must_use]
    pub fn last_turn_report_for(&self, viewer: Option<Role>) -> Option<TurnReport> {
        self.last_turn_report
            .as_ref()
            .map(|report| report.redacted_for(viewer))
    }

    pub(crate) fn current_turn_report(&self) -> Option<&TurnReport> {
        self.current_turn_report.as_ref()
    }

    pub(crate) fn last_turn_report(&self) -> Option<&TurnReport> {
        self.last_turn_report.as_ref()
    }

    // === Commands ===

    /// Commit a role's army. Once both are set the live board is built
    /// and the match moves to white's first turn.
    pub fn set_army(&mut self, role: Role, serialized: &str) -> RuleResult<()> {
        self.require_phase(&[Phase::Setup], "set_army")?;

        let army = ArmyBuilder::from_json(serialized)?;
        if army.colour() != role {
            return Err(RuleError::MalformedArmy(format!(
                "{role} submitted an army of {} pieces",
                army.colour()
            )));
        }
        if !army.is_valid_army() {
            return Err(RuleError::MalformedArmy("army must contain a king".into()));
        }

        *self.armies.get_mut(role) = Some(army);
        debug!(%role, "army committed");

        if let (Some(white), Some(black)) = (
            self.armies.get(Role::White).as_ref(),
            self.armies.get(Role::Black).as_ref(),
        ) {
            self.board = Some(Board::from_armies(white, black));
            self.phase = Phase::Move;
            self.current_role = Role::White;
            self.log(HistoryKind::Game, None, "both armies committed, white to move", None);
            debug!("match started");
        }
        Ok(())
    }

    /// Move a piece, resolving collisions, captures and castling.
    pub fn move_piece(&mut self, role: Role, src: Position, dest: Position) -> RuleResult<MoveOutcome> {
        self.require_phase(&[Phase::Move, Phase::PawnCapture], "move")?;
        self.require_current(role)?;

        let pawn_capture = self.phase == Phase::PawnCapture;
        if pawn_capture {
            let pending = self.board_ref()?.pending_pawn_captures(role);
            if !pending.contains(&PawnCapture { src, dest }) {
                return Err(RuleError::IllegalMove(format!(
                    "{src} to {dest} is not a pending pawn capture"
                )));
            }
        }

        let outcome = self.board_mut()?.resolve_move(role, src, dest, pawn_capture)?;
        debug!(%role, %src, %dest, kind = ?outcome.kind, "move resolved");

        if outcome.kind == MoveKind::Pawnbump {
            // The pawn never left its square; the turn is not consumed.
            let text = format!("{role} pawn at {src} bumped into an unseen piece");
            self.log(HistoryKind::Move, Some(role), text, Some(format!("{role} made a move")));
            return Ok(outcome);
        }

        self.record_move(role, &outcome);
        self.phase = if outcome.pawn_upgrade {
            Phase::PawnUpgrade
        } else {
            Phase::Iw
        };
        self.check_for_winner();
        Ok(outcome)
    }

    /// Query the pending pawn captures, entering the pawn-capture phase
    /// when any exist.
    pub fn pawn_capture_query(&mut self, role: Role) -> RuleResult<Vec<PawnCapture>> {
        self.require_phase(&[Phase::Move, Phase::PawnCapture], "pawn_capture_query")?;
        self.require_current(role)?;

        let captures = self.board_ref()?.pending_pawn_captures(role);
        self.phase = if captures.is_empty() {
            Phase::Move
        } else {
            Phase::PawnCapture
        };
        Ok(captures)
    }

    /// Replace the pawn that reached the farthest rank with a new,
    /// always-visible piece.
    pub fn pawn_upgrade(&mut self, role: Role, new_type: PieceType) -> RuleResult<UpgradeOutcome> {
        self.require_phase(&[Phase::PawnUpgrade], "pawn_upgrade")?;
        self.require_current(role)?;

        let (pos, new_type) = self.board_mut()?.upgrade_pawn(role, new_type)?;
        if let Some(report) = self.current_turn_report.as_mut() {
            if let Some(move_report) = report.move_report.as_mut() {
                move_report.upgraded_to = Some(new_type);
            }
        }
        let text = format!("{role} upgraded the pawn at {pos} to a {new_type}");
        self.log(HistoryKind::Upgrade, Some(role), text, None);
        self.phase = Phase::Iw;
        Ok(UpgradeOutcome { pos, new_type })
    }

    /// Launch an information-warfare attack. The cost is deducted up
    /// front; the opponent must respond with `iw_defense`.
    pub fn iw_attack(&mut self, role: Role, request: IwAttackRequest) -> RuleResult<IwAttackOutcome> {
        self.require_phase(&[Phase::Iw], "iw_attack")?;
        self.require_current(role)?;

        let costs = self.board_ref()?.costs(request.kind);
        let cost = match request.strength {
            IwStrength::Feint => {
                if costs.attack == 1 {
                    return Err(RuleError::InvalidInput(
                        "a feint cannot disguise a minimal attack; the base cost must be 2".into(),
                    ));
                }
                FEINT_COST
            }
            IwStrength::Normal => costs.attack,
            IwStrength::Reinforced => costs.attack + 1,
        };
        let available = self.board_ref()?.remaining_iw(role).get(request.kind);
        if available < cost {
            return Err(RuleError::InsufficientIw {
                needed: cost,
                available,
            });
        }

        self.board_mut()?.spend_iw(role, request.kind, cost);
        self.current_iw_attack = Some(IwAttack {
            attacker: role,
            kind: request.kind,
            strength: request.strength,
        });
        let text = format!("{role} launched a {} {} attack", request.strength, request.kind);
        let generic = format!("{role} launched a {} attack", request.kind);
        self.log(HistoryKind::Iw, Some(role), text, Some(generic));
        debug!(%role, kind = %request.kind, strength = %request.strength, cost, "iw attack launched");

        self.phase = Phase::Defense;
        self.current_role = role.opponent();
        Ok(IwAttackOutcome {
            defense_cost: costs.defend,
        })
    }

    /// Respond to a pending information-warfare attack.
    pub fn iw_defense(&mut self, role: Role, request: IwDefenseRequest) -> RuleResult<DefenseOutcome> {
        self.require_phase(&[Phase::Defense], "iw_defense")?;
        self.require_current(role)?;

        let attack = self
            .current_iw_attack
            .ok_or_else(|| RuleError::InvalidInput("there is no pending attack to defend".into()))?;
        let defender = role;

        // Psyop victim selection is settled up front for every strength
        // and either defend flag: skipping the prompt for feints or for
        // defended attacks would leak what the defender may not know.
        let victim_pos = if attack.kind == IwKind::Psyop {
            let targets = self.board_ref()?.psyop_targets(defender);
            match request.chosen_position {
                Some(pos) => {
                    if !targets.contains(&pos) {
                        return Err(RuleError::InvalidInput(format!(
                            "{pos} is not a psyop target"
                        )));
                    }
                    Some(pos)
                }
                None if targets.len() > 1 => {
                    return Ok(DefenseOutcome::ChooseVictim { targets });
                }
                None => targets.first().copied(),
            }
        } else {
            None
        };

        let costs = self.board_ref()?.costs(attack.kind);
        let available = self.board_ref()?.remaining_iw(defender).get(attack.kind);
        // Defending without the points to pay is treated as declining.
        let paying = request.defend && available >= costs.defend;

        if paying {
            self.board_mut()?.spend_iw(defender, attack.kind, costs.defend);
        }

        if paying && attack.strength != IwStrength::Reinforced {
            return self.resolve_defended(attack, defender);
        }
        self.resolve_full_effect(attack, defender, victim_pos)
    }

    /// Advance past the information-warfare phase without attacking.
    pub fn end_turn(&mut self, role: Role) -> RuleResult<()> {
        self.require_phase(&[Phase::Iw], "end_turn")?;
        self.require_current(role)?;
        if self.current_iw_attack.is_some() {
            return Err(RuleError::InvalidInput(
                "cannot end the turn with a pending attack".into(),
            ));
        }

        let text = format!("{role} took no information-warfare action");
        self.log(HistoryKind::Iw, Some(role), text, None);
        self.publish_turn_report(role);
        self.phase = Phase::Move;
        self.current_role = role.opponent();
        debug!(%role, "turn ended");
        Ok(())
    }

    /// Concede the match.
    pub fn forfeit(&mut self, role: Role) -> RuleResult<()> {
        if self.phase == Phase::GameOver {
            return Err(RuleError::WrongPhase {
                command: "forfeit",
                phase: self.phase.name(),
            });
        }
        self.winner = Some(GameOutcome::Winner(role.opponent()));
        let text = format!("{role} forfeited; {} wins", role.opponent());
        self.log(HistoryKind::Game, None, text, None);
        self.finish();
        Ok(())
    }

    /// End the match in a draw.
    pub fn draw(&mut self) -> RuleResult<()> {
        if self.phase == Phase::GameOver {
            return Err(RuleError::WrongPhase {
                command: "draw",
                phase: self.phase.name(),
            });
        }
        self.winner = Some(GameOutcome::Draw);
        self.log(HistoryKind::Game, None, "the match ended in a draw", None);
        self.finish();
        Ok(())
    }

    // === Internals ===

    fn resolve_defended(&mut self, attack: IwAttack, defender: Role) -> RuleResult<DefenseOutcome> {
        self.board_mut()?.cycle_costs(attack.kind);
        self.current_iw_attack = None;

        let text = format!(
            "{defender} defended against {}'s {} attack",
            attack.attacker, attack.kind
        );
        self.log(HistoryKind::Defense, None, text, None);
        self.finish_iw_report(attack, false, None);
        self.publish_turn_report(attack.attacker);

        self.phase = Phase::Move;
        debug!(%defender, kind = %attack.kind, "attack defended");
        Ok(DefenseOutcome::Resolved(DefenseResult {
            attacker: attack.attacker,
            defender,
            kind: attack.kind,
            strength: attack.strength,
            result: DefenseVerdict::Defended,
            captured_piece: None,
            captured_position: None,
        }))
    }

    fn resolve_full_effect(
        &mut self,
        attack: IwAttack,
        defender: Role,
        victim_pos: Option<Position>,
    ) -> RuleResult<DefenseOutcome> {
        let mut captured: Option<(Piece, Position)> = None;

        match (attack.kind, attack.strength) {
            (_, IwStrength::Feint) => {
                let text = format!("{}'s {} attack was a feint", attack.attacker, attack.kind);
                self.log(HistoryKind::Defense, None, text, None);
            }
            (IwKind::Psyop, _) => {
                let (victim, pos) = self.board_mut()?.resolve_psyop_attack(&attack, victim_pos)?;
                let text = format!(
                    "{}'s psyop attack removed the {} at {pos}",
                    attack.attacker, victim
                );
                self.log(HistoryKind::Defense, None, text, None);
                self.board_mut()?.cycle_costs(IwKind::Psyop);
                captured = Some((victim, pos));
            }
            (IwKind::Ew, _) => {
                self.move_denied = Some(defender);
                let text = format!(
                    "{}'s ew attack denied {defender}'s next move",
                    attack.attacker
                );
                self.log(HistoryKind::Defense, None, text, None);
                self.board_mut()?.cycle_costs(IwKind::Ew);
            }
        }

        self.current_iw_attack = None;
        self.finish_iw_report(attack, true, captured.as_ref().map(|(p, pos)| (*pos, p.kind)));
        self.publish_turn_report(attack.attacker);

        // A landed (non-feint) ew attack skips the defender's move phase
        // entirely, dropping them straight into their own iw phase.
        if attack.kind == IwKind::Ew && attack.strength != IwStrength::Feint {
            self.phase = Phase::Iw;
            self.current_turn_report = Some(TurnReport {
                role: defender,
                move_report: Some(MoveReport::denied()),
                iw_report: None,
            });
        } else {
            self.phase = Phase::Move;
        }
        self.check_for_winner();
        debug!(attacker = %attack.attacker, kind = %attack.kind, "attack resolved at full effect");

        Ok(DefenseOutcome::Resolved(DefenseResult {
            attacker: attack.attacker,
            defender,
            kind: attack.kind,
            strength: attack.strength,
            result: DefenseVerdict::Success,
            captured_piece: captured.map(|(piece, _)| piece),
            captured_position: captured.map(|(_, pos)| pos),
        }))
    }

    fn record_move(&mut self, role: Role, outcome: &MoveOutcome) {
        let invisible = match outcome.kind {
            // A castling involving a still-hidden king stays hidden.
            MoveKind::Castling => outcome
                .king_dest
                .and_then(|pos| self.board.as_ref().and_then(|b| b.piece_at(pos)))
                .is_some_and(|king| king.invisible),
            _ => outcome.moving_piece.invisible,
        };

        let (kind, text) = match outcome.kind {
            MoveKind::Capture => (
                HistoryKind::Capture,
                format!(
                    "{role} {} captured the {} at {}",
                    outcome.moving_piece.kind,
                    outcome
                        .captured_piece
                        .map_or_else(|| "piece".to_string(), |p| p.to_string()),
                    outcome.captured_position.unwrap_or(outcome.dest),
                ),
            ),
            MoveKind::Castling => (
                HistoryKind::Castling,
                format!("{role} castled"),
            ),
            _ => (
                HistoryKind::Move,
                format!(
                    "{role} moved a {} from {} to {}",
                    outcome.moving_piece.kind, outcome.src, outcome.dest
                ),
            ),
        };
        let redacted = if invisible {
            Some(format!("{role} made a move"))
        } else {
            None
        };
        self.log(kind, Some(role), text, redacted);

        self.current_turn_report = Some(TurnReport {
            role,
            move_report: Some(MoveReport {
                kind: Some(outcome.kind),
                src: Some(outcome.src),
                dest: Some(outcome.dest),
                moving_piece: Some(outcome.moving_piece.kind),
                captured_piece: outcome.captured_piece.map(|p| p.kind),
                captured_position: outcome.captured_position,
                upgraded_to: None,
                invisible,
                denied: false,
            }),
            iw_report: None,
        });
    }

    fn finish_iw_report(&mut self, attack: IwAttack, success: bool, victim: Option<(Position, PieceType)>) {
        let report = self
            .current_turn_report
            .get_or_insert_with(|| TurnReport::new(attack.attacker));
        report.iw_report = Some(IwReport {
            kind: attack.kind,
            strength: attack.strength,
            success,
            victim_position: victim.map(|(pos, _)| pos),
            victim_type: victim.map(|(_, kind)| kind),
        });
    }

    fn publish_turn_report(&mut self, role: Role) {
        let report = self
            .current_turn_report
            .take()
            .unwrap_or_else(|| TurnReport::new(role));
        self.last_turn_report = Some(report);
        if self.move_denied == Some(role) {
            // The denial has been served: this role's cycle is over.
            self.move_denied = None;
        }
    }

    fn check_for_winner(&mut self) {
        if self.phase == Phase::Setup || self.phase == Phase::GameOver {
            return;
        }
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let winner = if !board.has_king(Role::White) {
            Some(Role::Black)
        } else if !board.has_king(Role::Black) {
            Some(Role::White)
        } else {
            None
        };
        if let Some(winner) = winner {
            self.winner = Some(GameOutcome::Winner(winner));
            let text = format!("{} wins: the {} king has fallen", winner, winner.opponent());
            self.log(HistoryKind::Game, None, text, None);
            self.finish();
        }
    }

    fn finish(&mut self) {
        if let Some(report) = self.current_turn_report.take() {
            self.last_turn_report = Some(report);
        }
        self.phase = Phase::GameOver;
        debug!(winner = ?self.winner, "match over");
    }

    fn log(
        &mut self,
        kind: HistoryKind,
        actor: Option<Role>,
        text: impl Into<String>,
        redacted: Option<String>,
    ) {
        let entry = HistoryEntry {
            seq: self.next_seq,
            kind,
            actor,
            text: text.into(),
            redacted,
        };
        self.next_seq += 1;
        self.history.push_back(entry);
    }

    fn require_phase(&self, allowed: &[Phase], command: &'static str) -> RuleResult<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(RuleError::WrongPhase {
                command,
                phase: self.phase.name(),
            })
        }
    }

    fn require_current(&self, role: Role) -> RuleResult<()> {
        if self.current_role == role {
            Ok(())
        } else {
            Err(RuleError::OutOfTurn(role))
        }
    }

    fn board_ref(&self) -> RuleResult<&Board> {
        self.board
            .as_ref()
            .ok_or_else(|| RuleError::InvalidInput("the match has not started".into()))
    }

    fn board_mut(&mut self) -> RuleResult<&mut Board> {
        self.board
            .as_mut()
            .ok_or_else(|| RuleError::InvalidInput("the match has not started".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_army(colour: Role) -> String {
        let mut army = ArmyBuilder::new(colour);
        army.place(PieceType::King, Position::new(4, colour.back_rank()))
            .unwrap();
        army.place(PieceType::Queen, Position::new(3, colour.back_rank()))
            .unwrap();
        army.place(PieceType::Pawn, Position::new(4, colour.home_rank(1)))
            .unwrap();
        army.to_json()
    }

    fn started_engine() -> MatchEngine {
        let mut engine = MatchEngine::new();
        engine.set_army(Role::White, &basic_army(Role::White)).unwrap();
        engine.set_army(Role::Black, &basic_army(Role::Black)).unwrap();
        engine
    }

    #[test]
    fn test_setup_requires_both_armies() {
        let mut engine = MatchEngine::new();
        assert_eq!(engine.phase(), Phase::Setup);

        engine.set_army(Role::White, &basic_army(Role::White)).unwrap();
        assert_eq!(engine.phase(), Phase::Setup);

        engine.set_army(Role::Black, &basic_army(Role::Black)).unwrap();
        assert_eq!(engine.phase(), Phase::Move);
        assert_eq!(engine.current_role(), Role::White);
    }

    #[test]
    fn test_set_army_rejects_wrong_colour() {
        let mut engine = MatchEngine::new();
        let result = engine.set_army(Role::White, &basic_army(Role::Black));
        assert!(matches!(result, Err(RuleError::MalformedArmy(_))));
    }

    #[test]
    fn test_set_army_requires_king() {
        let mut engine = MatchEngine::new();
        let mut army = ArmyBuilder::new(Role::White);
        army.place(PieceType::Queen, Position::new(3, 0)).unwrap();
        let result = engine.set_army(Role::White, &army.to_json());
        assert!(matches!(result, Err(RuleError::MalformedArmy(_))));
    }

    #[test]
    fn test_set_army_rejected_after_setup() {
        let mut engine = started_engine();
        let result = engine.set_army(Role::White, &basic_army(Role::White));
        assert!(matches!(result, Err(RuleError::WrongPhase { .. })));
    }

    #[test]
    fn test_move_out_of_turn_is_rejected() {
        let mut engine = started_engine();
        let result = engine.move_piece(Role::Black, Position::new(4, 6), Position::new(4, 5));
        assert_eq!(result, Err(RuleError::OutOfTurn(Role::Black)));
    }

    #[test]
    fn test_move_advances_to_iw() {
        let mut engine = started_engine();
        let outcome = engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();

        assert_eq!(outcome.kind, MoveKind::Move);
        assert_eq!(engine.phase(), Phase::Iw);
        assert_eq!(engine.current_role(), Role::White);
    }

    #[test]
    fn test_end_turn_alternates_roles() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();
        engine.end_turn(Role::White).unwrap();

        assert_eq!(engine.phase(), Phase::Move);
        assert_eq!(engine.current_role(), Role::Black);
        let report = engine.last_turn_report_for(None).unwrap();
        assert_eq!(report.role, Role::White);
        assert!(report.move_report.is_some());
    }

    #[test]
    fn test_forfeit_ends_the_match() {
        let mut engine = started_engine();
        engine.forfeit(Role::White).unwrap();

        assert_eq!(engine.phase(), Phase::GameOver);
        assert_eq!(engine.winner(), Some(GameOutcome::Winner(Role::Black)));
        assert!(engine.forfeit(Role::Black).is_err());
    }

    #[test]
    fn test_draw_ends_the_match() {
        let mut engine = started_engine();
        engine.draw().unwrap();
        assert_eq!(engine.winner(), Some(GameOutcome::Draw));
        assert_eq!(engine.phase(), Phase::GameOver);
    }

    #[test]
    fn test_feint_rejected_at_minimal_cost() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();

        let result = engine.iw_attack(
            Role::White,
            IwAttackRequest {
                kind: IwKind::Ew,
                strength: IwStrength::Feint,
            },
        );
        assert!(matches!(result, Err(RuleError::InvalidInput(_))));
        // The rejection changed nothing.
        assert_eq!(engine.phase(), Phase::Iw);
        assert_eq!(engine.board().unwrap().remaining_iw(Role::White).ew, 5);
    }

    #[test]
    fn test_iw_attack_deducts_and_prompts_defense() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();

        let outcome = engine
            .iw_attack(
                Role::White,
                IwAttackRequest {
                    kind: IwKind::Psyop,
                    strength: IwStrength::Normal,
                },
            )
            .unwrap();

        assert_eq!(outcome.defense_cost, 1);
        assert_eq!(engine.phase(), Phase::Defense);
        assert_eq!(engine.current_role(), Role::Black);
        assert_eq!(engine.board().unwrap().remaining_iw(Role::White).psyop, 4);
    }

    #[test]
    fn test_defended_attack_cycles_costs_and_reaches_move() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();
        engine
            .iw_attack(
                Role::White,
                IwAttackRequest {
                    kind: IwKind::Psyop,
                    strength: IwStrength::Normal,
                },
            )
            .unwrap();

        let outcome = engine
            .iw_defense(
                Role::Black,
                IwDefenseRequest {
                    defend: true,
                    chosen_position: None,
                },
            )
            .unwrap();

        match outcome {
            DefenseOutcome::Resolved(result) => {
                assert_eq!(result.result, DefenseVerdict::Defended);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
        assert_eq!(engine.phase(), Phase::Move);
        assert_eq!(engine.current_role(), Role::Black);
        // Defense paid one point and the psyop pair escalated.
        assert_eq!(engine.board().unwrap().remaining_iw(Role::Black).psyop, 4);
        assert_eq!(engine.board().unwrap().costs(IwKind::Psyop).attack, 2);
    }

    #[test]
    fn test_ew_success_denies_the_defender_move() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();
        engine
            .iw_attack(
                Role::White,
                IwAttackRequest {
                    kind: IwKind::Ew,
                    strength: IwStrength::Normal,
                },
            )
            .unwrap();

        engine
            .iw_defense(
                Role::Black,
                IwDefenseRequest {
                    defend: false,
                    chosen_position: None,
                },
            )
            .unwrap();

        // Black's move phase is skipped entirely.
        assert_eq!(engine.phase(), Phase::Iw);
        assert_eq!(engine.current_role(), Role::Black);
        assert_eq!(engine.move_denied(), Some(Role::Black));

        let result = engine.move_piece(Role::Black, Position::new(4, 6), Position::new(4, 5));
        assert!(matches!(result, Err(RuleError::WrongPhase { .. })));

        engine.end_turn(Role::Black).unwrap();
        assert_eq!(engine.phase(), Phase::Move);
        assert_eq!(engine.current_role(), Role::White);
        assert_eq!(engine.move_denied(), None);

        let report = engine.last_turn_report_for(None).unwrap();
        assert!(report.move_report.unwrap().denied);
    }

    #[test]
    fn test_reinforced_attack_defeats_paid_defense() {
        let mut engine = started_engine();
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();
        engine
            .iw_attack(
                Role::White,
                IwAttackRequest {
                    kind: IwKind::Ew,
                    strength: IwStrength::Reinforced,
                },
            )
            .unwrap();
        // Reinforced costs base + 1.
        assert_eq!(engine.board().unwrap().remaining_iw(Role::White).ew, 3);

        let outcome = engine
            .iw_defense(
                Role::Black,
                IwDefenseRequest {
                    defend: true,
                    chosen_position: None,
                },
            )
            .unwrap();

        match outcome {
            DefenseOutcome::Resolved(result) => {
                assert_eq!(result.result, DefenseVerdict::Success);
            }
            other => panic!("expected resolution, got {other:?}"),
        }
        // The defense was still paid for.
        assert_eq!(engine.board().unwrap().remaining_iw(Role::Black).ew, 4);
        assert_eq!(engine.move_denied(), Some(Role::Black));
    }

    #[test]
    fn test_pawnbump_keeps_the_turn() {
        let mut engine = started_engine();
        // March the white pawn up to bump range of black's pawn.
        engine
            .move_piece(Role::White, Position::new(4, 1), Position::new(4, 3))
            .unwrap();
        engine.end_turn(Role::White).unwrap();
        engine
            .move_piece(Role::Black, Position::new(3, 7), Position::new(0, 4))
            .unwrap();
        engine.end_turn(Role::Black).unwrap();
        engine
            .move_piece(Role::White, Position::new(4, 3), Position::new(4, 4))
            .unwrap();
        engine.end_turn(Role::White).unwrap();
        engine
            .move_piece(Role::Black, Position::new(4, 6), Position::new(4, 5))
            .unwrap();
        engine.end_turn(Role::Black).unwrap();

        let phase_before = engine.phase();
        let outcome = engine
            .move_piece(Role::White, Position::new(4, 4), Position::new(4, 5))
            .unwrap();

        assert_eq!(outcome.kind, MoveKind::Pawnbump);
        assert_eq!(engine.phase(), phase_before);
        assert_eq!(engine.current_role(), Role::White);
        assert_eq!(
            engine.board().unwrap().piece_at(Position::new(4, 4)).unwrap().kind,
            PieceType::Pawn
        );
    }

    #[test]
    fn test_pawn_capture_query_gates_the_phase() {
        let mut engine = started_engine();
        let captures = engine.pawn_capture_query(Role::White).unwrap();
        assert!(captures.is_empty());
        assert_eq!(engine.phase(), Phase::Move);
    }
}
