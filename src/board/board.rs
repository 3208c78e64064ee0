//! The live board: both armies merged, per-role information-warfare
//! budgets, and the oscillating attack cost pairs.
//!
//! ## Fog of war
//!
//! The piece map is the authoritative, omniscient state. Each role sees it
//! through [`Board::project`], which omits opposing pieces that are still
//! invisible. Visibility is monotone: pieces are revealed by capturing, by
//! arriving on the back three ranks, or by pawn upgrade, and never hidden
//! again.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::iw::{CostPair, IwAttack, IwBudget, IwKind};
use crate::core::{Position, Role, RoleMap, RuleError, RuleResult};
use crate::pieces::{Piece, PieceType};
use crate::setup::ArmyBuilder;

/// The most recent completed physical move, kept for en passant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub src: Position,
    pub dest: Position,
    pub kind: PieceType,
    pub colour: Role,
}

impl LastMove {
    /// Whether this move was a pawn double-step, making the passed-over
    /// square an en-passant target for one turn.
    #[must_use]
    pub fn is_double_step(&self) -> bool {
        self.kind == PieceType::Pawn && (self.src.y - self.dest.y).abs() == 2
    }

    /// The square the double-stepping pawn skipped over.
    #[must_use]
    pub fn passed_square(&self) -> Position {
        Position::new(self.dest.x, (self.src.y + self.dest.y) / 2)
    }
}

/// The live game board.
#[derive(Clone, Debug)]
pub struct Board {
    pieces: FxHashMap<Position, Piece>,
    remaining_iw: RoleMap<IwBudget>,
    psyop_costs: CostPair,
    ew_costs: CostPair,
    last_move: Option<LastMove>,
    pending_upgrade: Option<Position>,
}

impl Board {
    /// Build the live board from two committed armies.
    #[must_use]
    pub fn from_armies(white: &ArmyBuilder, black: &ArmyBuilder) -> Self {
        let mut pieces = FxHashMap::default();
        for army in [white, black] {
            for (&pos, &piece) in army.pieces() {
                pieces.insert(pos, piece);
            }
        }
        Self {
            pieces,
            remaining_iw: RoleMap::new(|role| {
                let ew = if role == Role::White {
                    white.ew_points()
                } else {
                    black.ew_points()
                };
                IwBudget::from_ew_split(ew)
            }),
            psyop_costs: CostPair::new(),
            ew_costs: CostPair::new(),
            last_move: None,
            pending_upgrade: None,
        }
    }

    /// Rebuild a board from raw parts (snapshot restoration).
    #[must_use]
    pub fn from_parts(
        pieces: FxHashMap<Position, Piece>,
        remaining_iw: RoleMap<IwBudget>,
        psyop_costs: CostPair,
        ew_costs: CostPair,
        last_move: Option<LastMove>,
        pending_upgrade: Option<Position>,
    ) -> Self {
        Self {
            pieces,
            remaining_iw,
            psyop_costs,
            ew_costs,
            last_move,
            pending_upgrade,
        }
    }

    // === Pieces ===

    /// The full, omniscient piece map.
    #[must_use]
    pub fn pieces(&self) -> &FxHashMap<Position, Piece> {
        &self.pieces
    }

    pub(crate) fn pieces_mut(&mut self) -> &mut FxHashMap<Position, Piece> {
        &mut self.pieces
    }

    /// The piece at a square, if any.
    #[must_use]
    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        self.pieces.get(&pos)
    }

    /// The role's view of the board: own pieces verbatim, opposing pieces
    /// only when revealed. Canonically ordered by position.
    #[must_use]
    pub fn project(&self, role: Role) -> BTreeMap<Position, Piece> {
        self.pieces
            .iter()
            .filter(|(_, piece)| piece.colour == role || !piece.invisible)
            .map(|(&pos, &piece)| (pos, piece))
            .collect()
    }

    /// The position of a role's king, if it is still on the board.
    #[must_use]
    pub fn king_position(&self, role: Role) -> Option<Position> {
        self.pieces
            .iter()
            .find(|(_, p)| p.kind == PieceType::King && p.colour == role)
            .map(|(&pos, _)| pos)
    }

    // === Information warfare ===

    /// The role's remaining information-warfare points.
    #[must_use]
    pub fn remaining_iw(&self, role: Role) -> IwBudget {
        *self.remaining_iw.get(role)
    }

    /// Deduct information-warfare points. Affordability is the caller's
    /// responsibility.
    pub fn spend_iw(&mut self, role: Role, kind: IwKind, amount: u8) {
        self.remaining_iw.get_mut(role).spend(kind, amount);
    }

    /// The current cost pair for an attack type.
    #[must_use]
    pub fn costs(&self, kind: IwKind) -> CostPair {
        match kind {
            IwKind::Psyop => self.psyop_costs,
            IwKind::Ew => self.ew_costs,
        }
    }

    /// Toggle an attack type's cost pair between (1,1) and (2,2).
    pub fn cycle_costs(&mut self, kind: IwKind) {
        match kind {
            IwKind::Psyop => self.psyop_costs.cycle(),
            IwKind::Ew => self.ew_costs.cycle(),
        }
    }

    /// Candidate victims for a psyop attack against `defender`: the
    /// defender pieces at maximum king-distance from the defender's own
    /// king, preferring pawns when both pawns and non-pawns share the
    /// maximum. Ties are returned in lexicographic position order for
    /// disambiguation.
    #[must_use]
    pub fn psyop_targets(&self, defender: Role) -> Vec<Position> {
        let defenders: BTreeMap<Position, Piece> = self
            .pieces
            .iter()
            .filter(|(_, p)| p.colour == defender)
            .map(|(&pos, &piece)| (pos, piece))
            .collect();

        if defenders.len() <= 1 {
            return defenders.keys().copied().collect();
        }

        let Some(king_pos) = self.king_position(defender) else {
            return Vec::new();
        };

        let max_distance = defenders
            .keys()
            .map(|pos| pos.king_distance(king_pos))
            .max()
            .unwrap_or(0);

        let at_max: Vec<(Position, PieceType)> = defenders
            .iter()
            .filter(|(pos, _)| pos.king_distance(king_pos) == max_distance)
            .map(|(&pos, piece)| (pos, piece.kind))
            .collect();

        let pawns: Vec<Position> = at_max
            .iter()
            .filter(|(_, kind)| *kind == PieceType::Pawn)
            .map(|&(pos, _)| pos)
            .collect();

        if pawns.is_empty() {
            at_max.into_iter().map(|(pos, _)| pos).collect()
        } else {
            pawns
        }
    }

    /// Resolve a psyop attack at full effect: remove the chosen (or sole)
    /// candidate from the board. Feints remove nothing and must not reach
    /// this point.
    pub fn resolve_psyop_attack(
        &mut self,
        attack: &IwAttack,
        chosen: Option<Position>,
    ) -> RuleResult<(Piece, Position)> {
        let targets = self.psyop_targets(attack.attacker.opponent());
        let victim_pos = match (chosen, targets.as_slice()) {
            (Some(pos), _) if targets.contains(&pos) => pos,
            (Some(pos), _) => {
                return Err(RuleError::InvalidInput(format!(
                    "{pos} is not a psyop target"
                )))
            }
            (None, [sole]) => *sole,
            (None, []) => {
                return Err(RuleError::InvalidInput(
                    "no psyop targets available".into(),
                ))
            }
            (None, _) => {
                return Err(RuleError::InvalidInput(
                    "psyop victim must be chosen among tied targets".into(),
                ))
            }
        };
        let victim = self
            .pieces
            .remove(&victim_pos)
            .ok_or_else(|| RuleError::InvalidInput(format!("no piece at {victim_pos}")))?;
        Ok((victim, victim_pos))
    }

    // === Move bookkeeping ===

    /// The most recent completed move.
    #[must_use]
    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub(crate) fn set_last_move(&mut self, last: LastMove) {
        self.last_move = Some(last);
    }

    /// The square of a pawn awaiting upgrade, if any.
    #[must_use]
    pub fn pending_upgrade(&self) -> Option<Position> {
        self.pending_upgrade
    }

    pub(crate) fn set_pending_upgrade(&mut self, pos: Option<Position>) {
        self.pending_upgrade = pos;
    }

    /// Replace the pawn awaiting upgrade with a new, always-visible piece.
    pub fn upgrade_pawn(&mut self, role: Role, new_type: PieceType) -> RuleResult<(Position, PieceType)> {
        if matches!(new_type, PieceType::King | PieceType::Pawn) {
            return Err(RuleError::InvalidInput(format!(
                "pawns cannot be upgraded to a {new_type}"
            )));
        }
        let pos = self
            .pending_upgrade
            .ok_or_else(|| RuleError::InvalidInput("no pawn awaiting upgrade".into()))?;
        match self.pieces.get(&pos) {
            Some(piece) if piece.kind == PieceType::Pawn && piece.colour == role => {}
            _ => {
                return Err(RuleError::InvalidInput(format!(
                    "no {role} pawn awaiting upgrade at {pos}"
                )))
            }
        }
        let mut upgraded = Piece::new(new_type, role);
        upgraded.reveal();
        self.pieces.insert(pos, upgraded);
        self.pending_upgrade = None;
        Ok((pos, new_type))
    }

    /// Whether a role's king is still on the board.
    #[must_use]
    pub fn has_king(&self, role: Role) -> bool {
        self.king_position(role).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::super::iw::IwStrength;
    use super::*;

    fn minimal_armies() -> (ArmyBuilder, ArmyBuilder) {
        let mut white = ArmyBuilder::new(Role::White);
        white.place(PieceType::King, Position::new(4, 0)).unwrap();
        white.place(PieceType::Queen, Position::new(3, 0)).unwrap();
        white.place(PieceType::Pawn, Position::new(4, 1)).unwrap();

        let mut black = ArmyBuilder::new(Role::Black);
        black.place(PieceType::King, Position::new(4, 7)).unwrap();
        black.place(PieceType::Rook, Position::new(0, 7)).unwrap();
        black.set_ew_points(8).unwrap();

        (white, black)
    }

    #[test]
    fn test_from_armies_merges_pieces_and_budgets() {
        let (white, black) = minimal_armies();
        let board = Board::from_armies(&white, &black);

        assert_eq!(board.pieces().len(), 5);
        assert_eq!(board.remaining_iw(Role::White), IwBudget { psyop: 5, ew: 5 });
        assert_eq!(board.remaining_iw(Role::Black), IwBudget { psyop: 2, ew: 8 });
    }

    #[test]
    fn test_project_hides_invisible_opponents() {
        let (white, black) = minimal_armies();
        let board = Board::from_armies(&white, &black);

        let black_view = board.project(Role::Black);
        // White king and pawn start invisible; the queen is visible.
        assert!(!black_view.contains_key(&Position::new(4, 0)));
        assert!(!black_view.contains_key(&Position::new(4, 1)));
        assert!(black_view.contains_key(&Position::new(3, 0)));
        // Black sees all of its own pieces.
        assert!(black_view.contains_key(&Position::new(4, 7)));
        assert!(black_view.contains_key(&Position::new(0, 7)));
    }

    #[test]
    fn test_psyop_targets_prefers_farthest_then_pawns() {
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(4, 7), Piece::new(PieceType::King, Role::Black));
        // Knight and pawn both at distance 7 from the king; pawn wins.
        pieces.insert(Position::new(4, 0), Piece::new(PieceType::Knight, Role::Black));
        pieces.insert(Position::new(3, 0), Piece::new(PieceType::Pawn, Role::Black));
        // Closer piece, never a candidate.
        pieces.insert(Position::new(4, 6), Piece::new(PieceType::Rook, Role::Black));
        let board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            None,
        );

        assert_eq!(board.psyop_targets(Role::Black), vec![Position::new(3, 0)]);
    }

    #[test]
    fn test_psyop_targets_sole_piece_is_the_candidate() {
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(4, 7), Piece::new(PieceType::King, Role::Black));
        let board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            None,
        );

        assert_eq!(board.psyop_targets(Role::Black), vec![Position::new(4, 7)]);
    }

    #[test]
    fn test_psyop_sole_piece_needs_no_king() {
        // A defender reduced to one kingless piece is still targetable.
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(0, 4), Piece::new(PieceType::King, Role::White));
        pieces.insert(Position::new(7, 7), Piece::new(PieceType::Queen, Role::Black));
        let mut board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            None,
        );

        assert_eq!(board.psyop_targets(Role::Black), vec![Position::new(7, 7)]);

        let attack = IwAttack {
            attacker: Role::White,
            kind: IwKind::Psyop,
            strength: IwStrength::Normal,
        };
        let (victim, pos) = board.resolve_psyop_attack(&attack, None).unwrap();
        assert_eq!(victim.kind, PieceType::Queen);
        assert_eq!(pos, Position::new(7, 7));
        assert!(board.piece_at(pos).is_none());
    }

    #[test]
    fn test_psyop_tied_targets_are_sorted() {
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(4, 7), Piece::new(PieceType::King, Role::Black));
        pieces.insert(Position::new(7, 0), Piece::new(PieceType::Pawn, Role::Black));
        pieces.insert(Position::new(1, 0), Piece::new(PieceType::Pawn, Role::Black));
        let board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            None,
        );

        assert_eq!(
            board.psyop_targets(Role::Black),
            vec![Position::new(1, 0), Position::new(7, 0)]
        );
    }

    #[test]
    fn test_resolve_psyop_requires_choice_among_ties() {
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(4, 7), Piece::new(PieceType::King, Role::Black));
        pieces.insert(Position::new(7, 0), Piece::new(PieceType::Pawn, Role::Black));
        pieces.insert(Position::new(1, 0), Piece::new(PieceType::Pawn, Role::Black));
        let mut board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            None,
        );
        let attack = IwAttack {
            attacker: Role::White,
            kind: IwKind::Psyop,
            strength: IwStrength::Normal,
        };

        assert!(board.resolve_psyop_attack(&attack, None).is_err());

        let (victim, pos) = board
            .resolve_psyop_attack(&attack, Some(Position::new(7, 0)))
            .unwrap();
        assert_eq!(victim.kind, PieceType::Pawn);
        assert_eq!(pos, Position::new(7, 0));
        assert!(board.piece_at(pos).is_none());
    }

    #[test]
    fn test_upgrade_pawn() {
        let mut pieces = FxHashMap::default();
        pieces.insert(Position::new(2, 7), Piece::new(PieceType::Pawn, Role::White));
        let mut board = Board::from_parts(
            pieces,
            RoleMap::with_value(IwBudget::from_ew_split(5)),
            CostPair::new(),
            CostPair::new(),
            None,
            Some(Position::new(2, 7)),
        );

        assert!(board.upgrade_pawn(Role::White, PieceType::King).is_err());
        let (pos, kind) = board.upgrade_pawn(Role::White, PieceType::Queen).unwrap();
        assert_eq!((pos, kind), (Position::new(2, 7), PieceType::Queen));

        let piece = board.piece_at(pos).unwrap();
        assert_eq!(piece.kind, PieceType::Queen);
        assert!(!piece.invisible);
        assert_eq!(board.pending_upgrade(), None);
        assert!(board.upgrade_pawn(Role::White, PieceType::Rook).is_err());
    }
}
