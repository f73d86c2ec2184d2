//! The six grid directions and their geometry.
//!
//! Order matters: `Direction::ALL` is the canonical neighbor iteration order
//! used by propagation and repair, so changing it changes generated output.

use glam::IVec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six axis-aligned neighbor directions.
///
/// X grows EAST, Y grows NORTH, Z grows UP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[serde(alias = "WFC_E", alias = "east")]
    East,
    #[serde(alias = "WFC_W", alias = "west")]
    West,
    #[serde(alias = "WFC_N", alias = "north")]
    North,
    #[serde(alias = "WFC_S", alias = "south")]
    South,
    #[serde(alias = "WFC_UP", alias = "up")]
    Up,
    #[serde(alias = "WFC_DN", alias = "down")]
    Down,
}

/// Horizontal directions in rotation order: a 90° step moves index `i` to `i + 1`.
pub const CARDINAL: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

impl Direction {
    /// All directions in canonical iteration order.
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::West,
        Direction::North,
        Direction::South,
        Direction::Up,
        Direction::Down,
    ];

    /// Position of this direction in [`Direction::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// Unit offset of the neighbor in this direction.
    pub fn offset(self) -> IVec3 {
        match self {
            Direction::East => IVec3::new(1, 0, 0),
            Direction::West => IVec3::new(-1, 0, 0),
            Direction::North => IVec3::new(0, 1, 0),
            Direction::South => IVec3::new(0, -1, 0),
            Direction::Up => IVec3::new(0, 0, 1),
            Direction::Down => IVec3::new(0, 0, -1),
        }
    }

    /// True for UP and DOWN, which rotation never remaps.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// Parse a direction name as written in tileset files.
    ///
    /// Accepts full names in any case (`east`, `EAST`) and the host
    /// property names (`WFC_E`, `WFC_UP`, `WFC_DN`, ...).
    pub fn from_name(name: &str) -> Option<Direction> {
        let upper = name.trim().to_ascii_uppercase();
        let dir = match upper.as_str() {
            "EAST" | "WFC_E" | "E" => Direction::East,
            "WEST" | "WFC_W" | "W" => Direction::West,
            "NORTH" | "WFC_N" | "N" => Direction::North,
            "SOUTH" | "WFC_S" | "S" => Direction::South,
            "UP" | "WFC_UP" => Direction::Up,
            "DOWN" | "WFC_DN" | "DN" => Direction::Down,
            _ => return None,
        };
        Some(dir)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::East => "EAST",
            Direction::West => "WEST",
            Direction::North => "NORTH",
            Direction::South => "SOUTH",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_offsets_cancel_with_opposite() {
        for dir in Direction::ALL {
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec3::ZERO);
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_from_name_accepts_host_properties() {
        assert_eq!(Direction::from_name("WFC_E"), Some(Direction::East));
        assert_eq!(Direction::from_name("wfc_dn"), Some(Direction::Down));
        assert_eq!(Direction::from_name("north"), Some(Direction::North));
        assert_eq!(Direction::from_name("sideways"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Direction::Up).unwrap();
        assert_eq!(json, "\"UP\"");
        let parsed: Direction = serde_json::from_str("\"WFC_S\"").unwrap();
        assert_eq!(parsed, Direction::South);
    }

    #[test]
    fn test_cardinal_excludes_vertical() {
        assert!(CARDINAL.iter().all(|d| !d.is_vertical()));
    }
}
