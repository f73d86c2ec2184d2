//! Tile model and socket compatibility.
//!
//! A tile carries one socket set per face. Two faces may touch when
//! [`sockets_compatible`] accepts their token sets:
//! - `"NA"` on either face vetoes the pair (checked first)
//! - `"*"` on either face accepts anything
//! - otherwise the sets must share at least one token

use crate::direction::Direction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Wildcard token: compatible with every face unless vetoed.
pub const WILDCARD: &str = "*";

/// Explicit incompatibility token. Overrides the wildcard.
pub const NOT_ALLOWED: &str = "NA";

pub const MIN_WEIGHT: f64 = 0.01;
pub const MAX_WEIGHT: f64 = 10.0;

/// Set of connection tokens on one face.
pub type SocketSet = BTreeSet<String>;

/// Socket sets for all six faces, indexed by [`Direction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sockets {
    faces: [SocketSet; 6],
}

impl Default for Sockets {
    /// Every face is `{"*"}`.
    fn default() -> Self {
        Self {
            faces: std::array::from_fn(|_| wildcard_set()),
        }
    }
}

impl Sockets {
    pub fn get(&self, dir: Direction) -> &SocketSet {
        &self.faces[dir.index()]
    }

    /// Replace one face. An empty set becomes `{"*"}` so every face stays populated.
    pub fn set<I, S>(&mut self, dir: Direction, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: SocketSet = tokens.into_iter().map(Into::into).collect();
        self.faces[dir.index()] = if set.is_empty() { wildcard_set() } else { set };
    }

    pub fn with<I, S>(mut self, dir: Direction, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(dir, tokens);
        self
    }

    /// Set all four horizontal faces to the same tokens.
    pub fn with_horizontal<S: AsRef<str>>(mut self, tokens: &[S]) -> Self {
        for dir in crate::direction::CARDINAL {
            self.set(dir, tokens.iter().map(|t| t.as_ref().to_string()));
        }
        self
    }

    /// Iterate `(direction, tokens)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &SocketSet)> + '_ {
        Direction::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    pub fn contains(&self, dir: Direction, token: &str) -> bool {
        self.get(dir).contains(token)
    }
}

fn wildcard_set() -> SocketSet {
    std::iter::once(WILDCARD.to_string()).collect()
}

/// A placeable unit as produced by a tile-source adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub name: String,
    pub sockets: Sockets,
    /// Placement likelihood, always within `[MIN_WEIGHT, MAX_WEIGHT]`.
    pub weight: f64,
    pub allow_rotation: bool,
}

impl Tile {
    /// A tile with wildcard faces, weight 1.0 and rotation allowed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sockets: Sockets::default(),
            weight: 1.0,
            allow_rotation: true,
        }
    }

    pub fn with_socket<I, S>(mut self, dir: Direction, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sockets.set(dir, tokens);
        self
    }

    pub fn with_sockets(mut self, sockets: Sockets) -> Self {
        self.sockets = sockets;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = clamp_weight(weight);
        self
    }

    pub fn with_rotation(mut self, allow: bool) -> Self {
        self.allow_rotation = allow;
        self
    }
}

/// Clamp a placement weight into the supported range. Non-finite input becomes 1.0.
pub fn clamp_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
    } else {
        1.0
    }
}

/// Whether face tokens `a` may touch face tokens `b`.
pub fn sockets_compatible(a: &SocketSet, b: &SocketSet) -> bool {
    if a.contains(NOT_ALLOWED) || b.contains(NOT_ALLOWED) {
        return false;
    }
    if a.contains(WILDCARD) || b.contains(WILDCARD) {
        return true;
    }
    !a.is_disjoint(b)
}

/// Split a comma-separated socket value into tokens.
///
/// Parts are trimmed and empty parts dropped; nothing left means `{"*"}`.
pub fn tokenize(value: &str) -> SocketSet {
    let set: SocketSet = value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    if set.is_empty() {
        wildcard_set()
    } else {
        set
    }
}

/// Interpret a textual boolean flag. Only `0`, `false` and `no` are false.
pub fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> SocketSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_na_vetoes_before_wildcard() {
        assert!(!sockets_compatible(&set(&["NA"]), &set(&["*"])));
        assert!(!sockets_compatible(&set(&["*"]), &set(&["road", "NA"])));
    }

    #[test]
    fn test_wildcard_law() {
        let samples = [
            set(&["road"]),
            set(&["grass", "water"]),
            set(&["*"]),
            set(&["anything_at_all"]),
        ];
        for s in &samples {
            assert!(sockets_compatible(&set(&["*"]), s));
            assert!(sockets_compatible(s, &set(&["*"])));
        }
        assert!(!sockets_compatible(&set(&["*"]), &set(&["NA", "road"])));
    }

    #[test]
    fn test_ordinary_tokens_intersect() {
        assert!(sockets_compatible(&set(&["road", "grass"]), &set(&["grass"])));
        assert!(!sockets_compatible(&set(&["road"]), &set(&["water"])));
    }

    #[test]
    fn test_compatibility_is_commutative() {
        let faces = [set(&["a"]), set(&["a", "b"]), set(&["*"]), set(&["NA"]), set(&["c"])];
        for a in &faces {
            for b in &faces {
                assert_eq!(sockets_compatible(a, b), sockets_compatible(b, a));
            }
        }
    }

    #[test]
    fn test_missing_faces_default_to_wildcard() {
        let tile = Tile::new("plain");
        for dir in Direction::ALL {
            assert_eq!(tile.sockets.get(dir), &set(&["*"]));
        }
    }

    #[test]
    fn test_empty_face_becomes_wildcard() {
        let tile = Tile::new("t").with_socket(Direction::Up, Vec::<String>::new());
        assert_eq!(tile.sockets.get(Direction::Up), &set(&["*"]));
    }

    #[test]
    fn test_weight_is_clamped() {
        assert_eq!(Tile::new("a").with_weight(0.0).weight, MIN_WEIGHT);
        assert_eq!(Tile::new("a").with_weight(50.0).weight, MAX_WEIGHT);
        assert_eq!(Tile::new("a").with_weight(2.5).weight, 2.5);
        assert_eq!(Tile::new("a").with_weight(f64::NAN).weight, 1.0);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("road, grass ,"), set(&["road", "grass"]));
        assert_eq!(tokenize("  "), set(&["*"]));
        assert_eq!(tokenize(""), set(&["*"]));
        assert_eq!(tokenize("NA"), set(&["NA"]));
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("False"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(" no "));
        assert!(parse_flag("yes"));
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
    }
}
