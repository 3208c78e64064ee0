//! Player roles and per-role data storage.
//!
//! ## Role
//!
//! The two sides of a match: white and black.
//!
//! ## RoleMap
//!
//! Per-role data storage with O(1) access, indexable by `Role`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use super::error::RuleError;

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    White,
    Black,
}

impl Role {
    /// Both roles, white first.
    pub const ALL: [Role; 2] = [Role::White, Role::Black];

    /// Get the opposing role.
    #[must_use]
    pub const fn opponent(self) -> Role {
        match self {
            Role::White => Role::Black,
            Role::Black => Role::White,
        }
    }

    /// Forward direction along the y axis: +1 for white, -1 for black.
    #[must_use]
    pub const fn forward(self) -> i8 {
        match self {
            Role::White => 1,
            Role::Black => -1,
        }
    }

    /// The role's back rank (rank 0 for white, rank 7 for black).
    #[must_use]
    pub const fn back_rank(self) -> i8 {
        match self {
            Role::White => 0,
            Role::Black => 7,
        }
    }

    /// Mirror a white-relative rank offset onto this role's side of the board.
    ///
    /// Offset 0 is the back rank, offset 1 the pawn rank, and so on.
    #[must_use]
    pub const fn home_rank(self, offset: i8) -> i8 {
        match self {
            Role::White => offset,
            Role::Black => 7 - offset,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::White => write!(f, "white"),
            Role::Black => write!(f, "black"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Role::White),
            "black" => Ok(Role::Black),
            other => Err(RuleError::UnknownRole(other.to_string())),
        }
    }
}

/// Per-role data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use infochess::core::{Role, RoleMap};
///
/// let mut points: RoleMap<u8> = RoleMap::with_value(10);
/// points[Role::Black] -= 3;
///
/// assert_eq!(points[Role::White], 10);
/// assert_eq!(points[Role::Black], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMap<T> {
    white: T,
    black: T,
}

impl<T> RoleMap<T> {
    /// Create a new RoleMap with values from a factory function.
    pub fn new(factory: impl Fn(Role) -> T) -> Self {
        Self {
            white: factory(Role::White),
            black: factory(Role::Black),
        }
    }

    /// Create a new RoleMap with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            white: value.clone(),
            black: value,
        }
    }

    /// Create a new RoleMap with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a role's data.
    #[must_use]
    pub fn get(&self, role: Role) -> &T {
        match role {
            Role::White => &self.white,
            Role::Black => &self.black,
        }
    }

    /// Get a mutable reference to a role's data.
    pub fn get_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::White => &mut self.white,
            Role::Black => &mut self.black,
        }
    }

    /// Iterate over (Role, &T) pairs, white first.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        [(Role::White, &self.white), (Role::Black, &self.black)].into_iter()
    }
}

impl<T> Index<Role> for RoleMap<T> {
    type Output = T;

    fn index(&self, role: Role) -> &Self::Output {
        self.get(role)
    }
}

impl<T> IndexMut<Role> for RoleMap<T> {
    fn index_mut(&mut self, role: Role) -> &mut Self::Output {
        self.get_mut(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_opponent() {
        assert_eq!(Role::White.opponent(), Role::Black);
        assert_eq!(Role::Black.opponent(), Role::White);
    }

    #[test]
    fn test_role_geometry() {
        assert_eq!(Role::White.forward(), 1);
        assert_eq!(Role::Black.forward(), -1);
        assert_eq!(Role::White.back_rank(), 0);
        assert_eq!(Role::Black.back_rank(), 7);
        assert_eq!(Role::White.home_rank(1), 1);
        assert_eq!(Role::Black.home_rank(1), 6);
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(format!("{}", Role::White), "white");
        assert_eq!("black".parse::<Role>().unwrap(), Role::Black);
        assert!("purple".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::White).unwrap();
        assert_eq!(json, "\"white\"");
        let parsed: Role = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(parsed, Role::Black);
    }

    #[test]
    fn test_role_map_factory() {
        let map: RoleMap<i8> = RoleMap::new(|r| r.back_rank());
        assert_eq!(map[Role::White], 0);
        assert_eq!(map[Role::Black], 7);
    }

    #[test]
    fn test_role_map_mutation() {
        let mut map: RoleMap<u8> = RoleMap::with_value(5);
        map[Role::Black] = 9;
        assert_eq!(map[Role::White], 5);
        assert_eq!(map[Role::Black], 9);
    }

    #[test]
    fn test_role_map_iter() {
        let map: RoleMap<u8> = RoleMap::new(|r| if r == Role::White { 1 } else { 2 });
        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![(Role::White, &1), (Role::Black, &2)]);
    }
}
