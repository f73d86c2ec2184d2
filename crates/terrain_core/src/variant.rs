//! Rotated tile variants.
//!
//! The solver works on variants, not tiles. Every tile contributes its
//! unrotated form; tiles that allow rotation also contribute 90°, 180° and
//! 270° forms. Variant indices are positional, so emission order is part of
//! the contract: grouped by source tile, ascending rotation.

use crate::direction::CARDINAL;
use crate::tile::{Sockets, Tile};
use serde::Serialize;

const ROTATION_SUFFIX: [&str; 4] = ["", "_r90", "_r180", "_r270"];

/// A tile in one fixed orientation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub name: String,
    /// Index of the source tile in the tile list.
    pub base: usize,
    /// Quarter turns applied to the base, 0..=3.
    pub rotation: u8,
    pub sockets: Sockets,
    pub weight: f64,
    /// Always false: a variant is never rotated again.
    pub allow_rotation: bool,
}

impl Variant {
    pub fn from_tile(tile: &Tile, base: usize, rotation: u8) -> Self {
        let rotation = rotation % 4;
        Self {
            name: format!("{}{}", tile.name, ROTATION_SUFFIX[rotation as usize]),
            base,
            rotation,
            sockets: rotate_sockets(&tile.sockets, rotation),
            weight: tile.weight,
            allow_rotation: false,
        }
    }

    /// Rotation in degrees, for sinks that orient meshes.
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation as f32 * 90.0
    }
}

/// Remap horizontal faces by `rot` quarter turns.
///
/// The face at `CARDINAL[i]` moves to `CARDINAL[(i + rot) % 4]`; UP and DOWN
/// are copied unchanged.
pub fn rotate_sockets(sockets: &Sockets, rot: u8) -> Sockets {
    let rot = (rot % 4) as usize;
    let mut out = sockets.clone();
    for (i, &dir) in CARDINAL.iter().enumerate() {
        let target = CARDINAL[(i + rot) % 4];
        out.set(target, sockets.get(dir).iter().cloned());
    }
    out
}

/// Expand tiles into the positional variant list used by the solver.
pub fn generate_variants(tiles: &[Tile]) -> Vec<Variant> {
    let mut variants = Vec::with_capacity(tiles.len() * 4);
    for (base, tile) in tiles.iter().enumerate() {
        let rotations: &[u8] = if tile.allow_rotation { &[0, 1, 2, 3] } else { &[0] };
        for &rot in rotations {
            variants.push(Variant::from_tile(tile, base, rot));
        }
    }
    variants
}
