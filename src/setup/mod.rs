//! Setup-phase army building.

pub mod army;

pub use army::{ArmyBuilder, MAX_POINTS};
