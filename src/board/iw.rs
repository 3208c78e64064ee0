//! Information-warfare economy types.
//!
//! Each role enters the match with a 10-point pool split between psyop and
//! electronic warfare. Attack and defend costs for each attack type start
//! at (1, 1) and toggle to (2, 2) whenever an attack of that type resolves
//! at full effect or is successfully defended, a tit-for-tat escalation.
//! Feints always cost 1 and are only available while the base attack cost
//! is 2, so a minimal attack cannot be disguised.

use serde::{Deserialize, Serialize};

use crate::core::Role;

/// The fixed cost of a feint.
pub const FEINT_COST: u8 = 1;

/// The two information-warfare attack types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IwKind {
    /// Removes the defender piece farthest from its own king.
    Psyop,
    /// Denies the defender's next physical move.
    Ew,
}

impl std::fmt::Display for IwKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IwKind::Psyop => write!(f, "psyop"),
            IwKind::Ew => write!(f, "ew"),
        }
    }
}

/// Attack strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IwStrength {
    /// Base cost; can be neutralized by a paid defense.
    Normal,
    /// Base cost + 1; defeats any defense.
    Reinforced,
    /// Cost 1; no effect beyond forcing a defense decision.
    Feint,
}

impl std::fmt::Display for IwStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IwStrength::Normal => write!(f, "normal"),
            IwStrength::Reinforced => write!(f, "reinforced"),
            IwStrength::Feint => write!(f, "feint"),
        }
    }
}

/// An oscillating attack/defend cost pair for one attack type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostPair {
    pub attack: u8,
    pub defend: u8,
}

impl CostPair {
    /// Costs start at (1, 1).
    #[must_use]
    pub const fn new() -> Self {
        Self { attack: 1, defend: 1 }
    }

    /// Toggle between (1, 1) and (2, 2).
    pub fn cycle(&mut self) {
        self.attack = 3 - self.attack;
        self.defend = 3 - self.defend;
    }
}

impl Default for CostPair {
    fn default() -> Self {
        Self::new()
    }
}

/// A role's remaining information-warfare points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwBudget {
    pub psyop: u8,
    pub ew: u8,
}

impl IwBudget {
    /// Split a 10-point pool by its electronic-warfare share.
    #[must_use]
    pub const fn from_ew_split(ew_points: u8) -> Self {
        Self {
            psyop: 10 - ew_points,
            ew: ew_points,
        }
    }

    /// Remaining points for one attack type.
    #[must_use]
    pub const fn get(&self, kind: IwKind) -> u8 {
        match kind {
            IwKind::Psyop => self.psyop,
            IwKind::Ew => self.ew,
        }
    }

    /// Deduct points from one attack type's pool.
    ///
    /// Callers must have validated affordability.
    pub fn spend(&mut self, kind: IwKind, amount: u8) {
        match kind {
            IwKind::Psyop => self.psyop -= amount,
            IwKind::Ew => self.ew -= amount,
        }
    }
}

/// A pending attack awaiting the defender's response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IwAttack {
    pub attacker: Role,
    pub kind: IwKind,
    pub strength: IwStrength,
}
