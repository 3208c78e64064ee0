//! Authoritative move resolution.
//!
//! A requested move is first shape-checked (the destination must be
//! reachable by the mover's pattern on an empty board), then executed by
//! walking one square at a time toward the destination. The walk stops at
//! the first occupied square, even short of the request; that is how a
//! sliding piece collides with a previously-unknown invisible piece
//! mid-path. All validation happens before any mutation.

use serde::{Deserialize, Serialize};

use super::board::{Board, LastMove};
use crate::core::{Position, Role, RuleError, RuleResult};
use crate::pieces::{Piece, PieceType};

/// How a move resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveKind {
    /// The piece arrived on an empty square.
    Move,
    /// An enemy piece was taken.
    Capture,
    /// King and rook swapped into their castled squares.
    Castling,
    /// A pawn ran into an unseen piece; the turn is not consumed.
    Pawnbump,
}

/// The result of a resolved move.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    #[serde(rename = "type")]
    pub kind: MoveKind,
    pub src: Position,
    /// The square actually reached, which may be short of the request.
    pub dest: Position,
    /// The moving piece, with any reveal applied.
    pub moving_piece: Piece,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_piece: Option<Piece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub king_dest: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rook_dest: Option<Position>,
    /// Set when a pawn reached the farthest rank; the caller must follow
    /// up with the upgrade operation.
    #[serde(default)]
    pub pawn_upgrade: bool,
}

impl MoveOutcome {
    fn new(kind: MoveKind, src: Position, dest: Position, moving_piece: Piece) -> Self {
        Self {
            kind,
            src,
            dest,
            moving_piece,
            captured_piece: None,
            captured_position: None,
            king_dest: None,
            rook_dest: None,
            pawn_upgrade: false,
        }
    }
}

/// Whether arriving on `dest` reveals a piece of `colour`: the back three
/// ranks of the board expose anything that enters them.
fn arrival_reveals(colour: Role, dest: Position) -> bool {
    match colour {
        Role::White => dest.y >= 5,
        Role::Black => dest.y <= 2,
    }
}

/// Whether `dest` is reachable from `src` by the mover's pattern on an
/// empty board. Castling requests (king or rook moving along the shared
/// back rank onto its partner's square) are shape-checked as rank moves.
fn reachable_shape(piece: &Piece, src: Position, dest: Position) -> bool {
    let dx = dest.x - src.x;
    let dy = dest.y - src.y;

    match piece.kind {
        PieceType::Pawn => {
            let dir = piece.colour.forward();
            (dx == 0 && dy == dir)
                || (dx == 0 && dy == 2 * dir && src.y == piece.starting_rank())
                || (dx.abs() == 1 && dy == dir)
        }
        PieceType::King => {
            let castling_request = src == Position::new(4, piece.colour.back_rank())
                && dy == 0
                && (dest.x == 0 || dest.x == 7);
            (dx.abs() <= 1 && dy.abs() <= 1) || castling_request
        }
        PieceType::Knight => {
            (dx.abs() == 1 && dy.abs() == 2) || (dx.abs() == 2 && dy.abs() == 1)
        }
        PieceType::Rook => dx == 0 || dy == 0,
        PieceType::Bishop => dx.abs() == dy.abs(),
        PieceType::Queen => dx == 0 || dy == 0 || dx.abs() == dy.abs(),
    }
}

impl Board {
    /// Resolve a move or attack.
    ///
    /// `pawn_capture` marks resolution during the pawn-capture phase,
    /// where pawn/invisible collisions capture instead of bumping and
    /// en-passant takes are permitted. The caller validates that the
    /// request is one of [`Board::pending_pawn_captures`] in that phase.
    pub fn resolve_move(
        &mut self,
        role: Role,
        src: Position,
        dest: Position,
        pawn_capture: bool,
    ) -> RuleResult<MoveOutcome> {
        if !src.is_on_board() {
            return Err(RuleError::OutOfBounds(src));
        }
        if !dest.is_on_board() {
            return Err(RuleError::OutOfBounds(dest));
        }
        if src == dest {
            return Err(RuleError::IllegalMove(format!(
                "src and dest are both {src}"
            )));
        }
        let mover = match self.piece_at(src) {
            Some(piece) if piece.colour == role => *piece,
            _ => {
                return Err(RuleError::InvalidInput(format!(
                    "there is no {role} piece at {src}"
                )))
            }
        };
        if !reachable_shape(&mover, src, dest) {
            return Err(RuleError::IllegalMove(format!(
                "a {} cannot move from {src} to {dest}",
                mover.kind
            )));
        }

        // Knights teleport; everything else walks and stops at the first
        // occupied square.
        let (stop, target) = if mover.kind == PieceType::Knight {
            (dest, self.piece_at(dest).copied())
        } else {
            self.walk(src, dest)
        };

        // A multi-square king request is only ever a castling request; the
        // walk must reach the corner rook unobstructed.
        if mover.kind == PieceType::King && (dest.x - src.x).abs() > 1 {
            let reached_partner = stop == dest
                && target.is_some_and(|t| t.colour == role && t.kind == PieceType::Rook);
            if !reached_partner {
                return Err(RuleError::IllegalMove(format!(
                    "castling from {src} requires a clear path to a rook at {dest}"
                )));
            }
        }

        match target {
            Some(target) if target.colour != role => {
                self.resolve_against_enemy(role, mover, src, stop, target, pawn_capture)
            }
            Some(target) => self.resolve_castling(role, mover, src, stop, target),
            None => self.resolve_arrival(role, mover, src, dest, pawn_capture),
        }
    }

    /// Step from `src` toward `dest`, returning the first occupied square
    /// and its piece, or `dest` itself when the path is clear.
    fn walk(&self, src: Position, dest: Position) -> (Position, Option<Piece>) {
        let step_x = (dest.x - src.x).signum();
        let step_y = (dest.y - src.y).signum();
        let mut square = src;
        loop {
            square = square.offset(step_x, step_y);
            if let Some(piece) = self.piece_at(square) {
                return (square, Some(*piece));
            }
            if square == dest {
                return (dest, None);
            }
        }
    }

    fn resolve_against_enemy(
        &mut self,
        role: Role,
        mover: Piece,
        src: Position,
        stop: Position,
        target: Piece,
        pawn_capture: bool,
    ) -> RuleResult<MoveOutcome> {
        if mover.kind == PieceType::Pawn {
            if target.invisible && !pawn_capture {
                // Bumping into an unseen piece does not consume the turn
                // and moves nothing.
                return Ok(MoveOutcome::new(MoveKind::Pawnbump, src, stop, mover));
            }
            if stop.x == src.x {
                // Straight ahead a pawn can only be blocked, never capture.
                return Err(RuleError::IllegalMove(format!(
                    "pawn at {src} is blocked by a piece at {stop}"
                )));
            }
        }

        let mut mover = mover;
        self.pieces_mut().remove(&src);
        let captured = self.pieces_mut().remove(&stop);
        mover.reveal();
        self.pieces_mut().insert(stop, mover);
        self.set_last_move(LastMove {
            src,
            dest: stop,
            kind: mover.kind,
            colour: role,
        });

        let mut outcome = MoveOutcome::new(MoveKind::Capture, src, stop, mover);
        outcome.captured_piece = captured;
        outcome.captured_position = Some(stop);
        self.flag_pawn_upgrade(&mut outcome, role);
        Ok(outcome)
    }

    fn resolve_castling(
        &mut self,
        role: Role,
        mover: Piece,
        src: Position,
        stop: Position,
        target: Piece,
    ) -> RuleResult<MoveOutcome> {
        let (king_pos, rook_pos, king, rook) = match (mover.kind, target.kind) {
            (PieceType::King, PieceType::Rook) => (src, stop, mover, target),
            (PieceType::Rook, PieceType::King) => (stop, src, target, mover),
            _ => {
                return Err(RuleError::IllegalMove(format!(
                    "{src} to {stop} lands on a friendly piece"
                )))
            }
        };

        let rank = role.back_rank();
        if king_pos != Position::new(4, rank) {
            return Err(RuleError::IllegalMove(
                "castling requires the king on its starting square".into(),
            ));
        }
        if rook_pos.y != rank || (rook_pos.x != 0 && rook_pos.x != 7) {
            return Err(RuleError::IllegalMove(
                "castling requires the rook on its original corner".into(),
            ));
        }

        // The walk stopping on the partner guarantees the squares between
        // them are empty.
        let towards_rook = (rook_pos.x - king_pos.x).signum();
        let king_dest = Position::new(king_pos.x + 2 * towards_rook, rank);
        let rook_dest = Position::new(king_pos.x + towards_rook, rank);

        self.pieces_mut().remove(&king_pos);
        self.pieces_mut().remove(&rook_pos);
        self.pieces_mut().insert(king_dest, king);
        self.pieces_mut().insert(rook_dest, rook);
        self.set_last_move(LastMove {
            src,
            dest: stop,
            kind: mover.kind,
            colour: role,
        });

        let mut outcome = MoveOutcome::new(MoveKind::Castling, src, stop, mover);
        outcome.king_dest = Some(king_dest);
        outcome.rook_dest = Some(rook_dest);
        Ok(outcome)
    }

    fn resolve_arrival(
        &mut self,
        role: Role,
        mover: Piece,
        src: Position,
        dest: Position,
        pawn_capture: bool,
    ) -> RuleResult<MoveOutcome> {
        if mover.kind == PieceType::Pawn && dest.x != src.x {
            // A diagonal pawn move onto an empty square is only legal as an
            // en-passant take during the pawn-capture phase.
            return self.resolve_en_passant(role, mover, src, dest, pawn_capture);
        }

        let mut mover = mover;
        self.pieces_mut().remove(&src);
        if arrival_reveals(role, dest) {
            mover.reveal();
        }
        self.pieces_mut().insert(dest, mover);
        self.set_last_move(LastMove {
            src,
            dest,
            kind: mover.kind,
            colour: role,
        });

        let mut outcome = MoveOutcome::new(MoveKind::Move, src, dest, mover);
        self.flag_pawn_upgrade(&mut outcome, role);
        Ok(outcome)
    }

    fn resolve_en_passant(
        &mut self,
        role: Role,
        mover: Piece,
        src: Position,
        dest: Position,
        pawn_capture: bool,
    ) -> RuleResult<MoveOutcome> {
        let passed_pawn = match self.last_move() {
            Some(last)
                if pawn_capture
                    && last.colour != role
                    && last.is_double_step()
                    && last.passed_square() == dest =>
            {
                last.dest
            }
            _ => {
                return Err(RuleError::IllegalMove(format!(
                    "{dest} is not an en passant target"
                )))
            }
        };

        let mut mover = mover;
        self.pieces_mut().remove(&src);
        let captured = self.pieces_mut().remove(&passed_pawn);
        mover.reveal();
        self.pieces_mut().insert(dest, mover);
        self.set_last_move(LastMove {
            src,
            dest,
            kind: mover.kind,
            colour: role,
        });

        let mut outcome = MoveOutcome::new(MoveKind::Capture, src, dest, mover);
        outcome.captured_piece = captured;
        outcome.captured_position = Some(passed_pawn);
        self.flag_pawn_upgrade(&mut outcome, role);
        Ok(outcome)
    }

    fn flag_pawn_upgrade(&mut self, outcome: &mut MoveOutcome, role: Role) {
        if outcome.moving_piece.kind == PieceType::Pawn
            && outcome.dest.y == role.home_rank(7)
        {
            self.set_pending_upgrade(Some(outcome.dest));
            outcome.pawn_upgrade = true;
        }
    }
}
