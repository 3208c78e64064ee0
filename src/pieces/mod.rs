//! Piece types, the piece catalog, and piece instances.

pub mod catalog;
pub mod piece;

pub use catalog::PieceType;
pub use piece::Piece;
