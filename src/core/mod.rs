//! Core engine types: roles, board positions, error handling.
//!
//! This module contains the fundamental building blocks shared by every
//! other component: the two match roles, the 8x8 board coordinate type,
//! and the single error type surfaced from all fallible operations.

pub mod error;
pub mod position;
pub mod role;

pub use error::{RuleError, RuleResult};
pub use position::Position;
pub use role::{Role, RoleMap};
