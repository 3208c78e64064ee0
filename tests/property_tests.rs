//! Property-based invariant tests.
//!
//! Randomized checks over the invariants the rest of the engine leans
//! on: the board geometry helpers, the army budget, fog-of-war
//! projection, and the walk-based move resolution.

use proptest::prelude::*;

use infochess::{
    ArmyBuilder, Board, CostPair, IwBudget, MoveKind, Piece, PieceType, Position, Role, RoleMap,
};
use rustc_hash::FxHashMap;

fn any_position() -> impl Strategy<Value = Position> {
    (0i8..8, 0i8..8).prop_map(|(x, y)| Position::new(x, y))
}

fn any_piece_type() -> impl Strategy<Value = PieceType> {
    prop::sample::select(PieceType::ALL.to_vec())
}

fn board_from(pieces: FxHashMap<Position, Piece>) -> Board {
    Board::from_parts(
        pieces,
        RoleMap::with_value(IwBudget::from_ew_split(5)),
        CostPair::new(),
        CostPair::new(),
        None,
        None,
    )
}

proptest! {
    /// Square colours are a two-colouring: parity flips across any edge.
    #[test]
    fn prop_square_colour_is_a_two_colouring(pos in any_position()) {
        let colour = pos.square_colour();
        prop_assert!(colour == 0 || colour == 1);

        for (dx, dy) in [(1, 0), (0, 1)] {
            let neighbour = pos.offset(dx, dy);
            if neighbour.is_on_board() {
                prop_assert_ne!(neighbour.square_colour(), colour);
            }
        }
    }

    /// King distance is symmetric and zero only on the diagonal.
    #[test]
    fn prop_king_distance_symmetric(a in any_position(), b in any_position()) {
        prop_assert_eq!(a.king_distance(b), b.king_distance(a));
        prop_assert_eq!(a.king_distance(b) == 0, a == b);
    }

    /// Position keys round-trip through the wire format.
    #[test]
    fn prop_position_key_round_trips(pos in any_position()) {
        prop_assert_eq!(Position::from_key(&pos.key()).unwrap(), pos);
    }

    /// No sequence of placements ever exceeds the budget or a count
    /// limit: `place` enforces what `can_place` promises.
    #[test]
    fn prop_army_never_exceeds_budget(
        placements in prop::collection::vec((any_piece_type(), any_position()), 0..30)
    ) {
        let mut army = ArmyBuilder::new(Role::White);
        for (kind, pos) in placements {
            // Rejections are fine; what matters is the invariant below.
            let _ = army.place(kind, pos);
            prop_assert!(army.points() <= infochess::MAX_POINTS);
            for kind in PieceType::ALL {
                prop_assert!(army.count(kind) <= kind.limit());
            }
        }
    }

    /// Projection never leaks an invisible opposing piece and never
    /// drops one of the viewer's own.
    #[test]
    fn prop_projection_never_leaks(
        placements in prop::collection::vec(
            (any_position(), any_piece_type(), prop::bool::ANY, prop::bool::ANY),
            1..24,
        ),
        viewer_is_white in prop::bool::ANY,
    ) {
        let mut pieces = FxHashMap::default();
        for (pos, kind, is_white, revealed) in placements {
            let colour = if is_white { Role::White } else { Role::Black };
            let mut piece = Piece::new(kind, colour);
            if revealed {
                piece.reveal();
            }
            pieces.insert(pos, piece);
        }
        let viewer = if viewer_is_white { Role::White } else { Role::Black };
        let board = board_from(pieces);

        let view = board.project(viewer);
        for (pos, piece) in board.pieces() {
            let visible = view.contains_key(pos);
            if piece.colour == viewer {
                prop_assert!(visible);
            } else {
                prop_assert_eq!(visible, !piece.invisible);
            }
        }
    }

    /// A rook sliding up an empty file toward a blocker always stops on
    /// the blocker's square, never beyond it.
    #[test]
    fn prop_walk_stops_at_first_obstruction(
        file in 0i8..8,
        blocker_rank in 2i8..8,
        request_rank in 2i8..8,
    ) {
        prop_assume!(request_rank >= blocker_rank);

        let mut pieces = FxHashMap::default();
        pieces.insert(
            Position::new(file, 0),
            Piece::new(PieceType::Rook, Role::White),
        );
        pieces.insert(
            Position::new(file, blocker_rank),
            Piece::new(PieceType::Pawn, Role::Black),
        );
        let mut board = board_from(pieces);

        let outcome = board
            .resolve_move(
                Role::White,
                Position::new(file, 0),
                Position::new(file, request_rank),
                false,
            )
            .unwrap();

        prop_assert_eq!(outcome.kind, MoveKind::Capture);
        prop_assert_eq!(outcome.dest, Position::new(file, blocker_rank));
        prop_assert!(board.piece_at(Position::new(file, request_rank + 1)).is_none());
    }

    /// A pawn bumping into an invisible piece changes nothing on the
    /// board.
    #[test]
    fn prop_pawnbump_is_a_no_op(file in 0i8..8, rank in 1i8..6) {
        let mut pieces = FxHashMap::default();
        pieces.insert(
            Position::new(file, rank),
            Piece::new(PieceType::Pawn, Role::White),
        );
        pieces.insert(
            Position::new(file, rank + 1),
            Piece::new(PieceType::Knight, Role::Black),
        );
        let mut board = board_from(pieces.clone());

        let outcome = board
            .resolve_move(
                Role::White,
                Position::new(file, rank),
                Position::new(file, rank + 1),
                false,
            )
            .unwrap();

        prop_assert_eq!(outcome.kind, MoveKind::Pawnbump);
        prop_assert_eq!(board.pieces(), &pieces);
        prop_assert!(board.last_move().is_none());
    }
}
