//! Legal move generation.
//!
//! Destinations are generated over the true board, so a player consulting
//! their own projection may request a move that collides with an invisible
//! piece mid-path; that collision is resolved by
//! [`Board::resolve_move`](super::resolve), not here.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::board::Board;
use crate::core::{Position, Role};
use crate::pieces::{Piece, PieceType};

/// King and rook landing squares for one castling side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingMove {
    pub king: Position,
    pub rook: Position,
}

/// The castling sides currently available to a role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastlingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queenside: Option<CastlingMove>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kingside: Option<CastlingMove>,
}

/// A pending pawn capture: a pawn and the square it may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PawnCapture {
    pub src: Position,
    pub dest: Position,
}

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

const ROOK_RAYS: [(i8, i8); 4] = [(0, 1), (1, 0), (-1, 0), (0, -1)];
const BISHOP_RAYS: [(i8, i8); 4] = [(-1, 1), (-1, -1), (1, 1), (1, -1)];

impl Board {
    /// Per-type destination generator over the true board.
    ///
    /// Sliding pieces include the first enemy-occupied square on each ray
    /// and stop there; squares holding friendly pieces are never included.
    /// Canonically ordered by position.
    #[must_use]
    pub fn legal_destinations(&self, piece: &Piece, pos: Position) -> Vec<Position> {
        let mut moves: SmallVec<[Position; 16]> = SmallVec::new();

        match piece.kind {
            PieceType::Pawn => {
                let dir = piece.colour.forward();
                let one = pos.offset(0, dir);
                if self.add_if_unoccupied(&mut moves, one) && pos.y == piece.starting_rank() {
                    // Pawns may move two from the starting rank.
                    self.add_if_unoccupied(&mut moves, pos.offset(0, 2 * dir));
                }
                self.add_if_enemy(&mut moves, piece, pos.offset(1, dir));
                self.add_if_enemy(&mut moves, piece, pos.offset(-1, dir));
            }
            PieceType::King => {
                for (dx, dy) in KING_OFFSETS {
                    self.add_unless_friendly(&mut moves, piece, pos.offset(dx, dy));
                }
            }
            PieceType::Knight => {
                for (dx, dy) in KNIGHT_OFFSETS {
                    self.add_unless_friendly(&mut moves, piece, pos.offset(dx, dy));
                }
            }
            PieceType::Rook => self.add_rays(&mut moves, piece, pos, &ROOK_RAYS),
            PieceType::Bishop => self.add_rays(&mut moves, piece, pos, &BISHOP_RAYS),
            PieceType::Queen => {
                self.add_rays(&mut moves, piece, pos, &ROOK_RAYS);
                self.add_rays(&mut moves, piece, pos, &BISHOP_RAYS);
            }
        }

        let mut moves: Vec<Position> = moves.into_vec();
        moves.sort_unstable();
        moves
    }

    fn add_if_unoccupied(&self, moves: &mut SmallVec<[Position; 16]>, pos: Position) -> bool {
        if pos.is_on_board() && self.piece_at(pos).is_none() {
            moves.push(pos);
            true
        } else {
            false
        }
    }

    fn add_if_enemy(&self, moves: &mut SmallVec<[Position; 16]>, piece: &Piece, pos: Position) {
        if !pos.is_on_board() {
            return;
        }
        if let Some(target) = self.piece_at(pos) {
            if target.colour != piece.colour {
                moves.push(pos);
            }
        }
    }

    fn add_unless_friendly(&self, moves: &mut SmallVec<[Position; 16]>, piece: &Piece, pos: Position) {
        if !pos.is_on_board() {
            return;
        }
        match self.piece_at(pos) {
            Some(target) if target.colour == piece.colour => {}
            _ => moves.push(pos),
        }
    }

    fn add_rays(
        &self,
        moves: &mut SmallVec<[Position; 16]>,
        piece: &Piece,
        pos: Position,
        rays: &[(i8, i8); 4],
    ) {
        for &(dx, dy) in rays {
            let mut square = pos.offset(dx, dy);
            while square.is_on_board() {
                match self.piece_at(square) {
                    None => moves.push(square),
                    Some(target) => {
                        if target.colour != piece.colour {
                            moves.push(square);
                        }
                        break;
                    }
                }
                square = square.offset(dx, dy);
            }
        }
    }

    /// The castling sides still open to a role.
    ///
    /// Eligibility is purely positional: the king must stand on its
    /// starting square and a rook on its original corner, with every
    /// square between them empty. No moved-piece history is consulted.
    #[must_use]
    pub fn castling_options(&self, role: Role) -> CastlingOptions {
        let rank = role.back_rank();
        let mut options = CastlingOptions::default();

        let king_home = Position::new(4, rank);
        let is_own = |pos: Position, kind: PieceType| {
            self.piece_at(pos)
                .is_some_and(|p| p.kind == kind && p.colour == role)
        };
        if !is_own(king_home, PieceType::King) {
            return options;
        }

        let empty = |xs: &[i8]| {
            xs.iter()
                .all(|&x| self.piece_at(Position::new(x, rank)).is_none())
        };

        if is_own(Position::new(0, rank), PieceType::Rook) && empty(&[1, 2, 3]) {
            options.queenside = Some(CastlingMove {
                king: Position::new(2, rank),
                rook: Position::new(3, rank),
            });
        }
        if is_own(Position::new(7, rank), PieceType::Rook) && empty(&[5, 6]) {
            options.kingside = Some(CastlingMove {
                king: Position::new(6, rank),
                rook: Position::new(5, rank),
            });
        }
        options
    }

    /// All pawn captures currently open to a role: own pawns standing
    /// diagonally-forward-adjacent to an invisible enemy piece, plus any
    /// en-passant take derived from the last move. Ordered by (src, dest).
    #[must_use]
    pub fn pending_pawn_captures(&self, role: Role) -> Vec<PawnCapture> {
        let mut captures = Vec::new();

        for (&pos, piece) in self.pieces() {
            if piece.kind != PieceType::Pawn || piece.colour != role {
                continue;
            }
            let dir = role.forward();
            for dx in [-1, 1] {
                let dest = pos.offset(dx, dir);
                if !dest.is_on_board() {
                    continue;
                }
                if let Some(target) = self.piece_at(dest) {
                    if target.invisible && target.colour != role {
                        captures.push(PawnCapture { src: pos, dest });
                    }
                }
            }
        }

        if let Some(last) = self.last_move() {
            if last.colour != role && last.is_double_step() {
                let dest = last.passed_square();
                for dx in [-1, 1] {
                    let src = last.dest.offset(dx, 0);
                    let is_own_pawn = src.is_on_board()
                        && self
                            .piece_at(src)
                            .is_some_and(|p| p.kind == PieceType::Pawn && p.colour == role);
                    if is_own_pawn {
                        captures.push(PawnCapture { src, dest });
                    }
                }
            }
        }

        captures.sort_unstable();
        captures
    }
}
