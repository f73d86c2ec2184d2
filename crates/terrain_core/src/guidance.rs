//! Placement guidance: per-cell, per-variant weight multipliers.
//!
//! The solver multiplies each option's base weight by the guidance score
//! before sampling. Guidance is read-only: it sees coordinates and a variant
//! index, never solver state.

use crate::direction::Direction;
use crate::heightmap::HeightField;
use crate::variant::Variant;
use crate::wfc::GridSize;

pub const DEFAULT_AIR_TOKEN: &str = "air";
pub const DEFAULT_GROUND_TOKEN: &str = "ground";
pub const MAX_INFLUENCE: f64 = 5.0;

/// Score for placing `variant` at `(x, y, z)`. 1.0 is neutral.
pub trait Guidance {
    fn weight(&self, x: usize, y: usize, z: usize, variant: usize) -> f64;
}

/// Neutral guidance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unguided;

impl Guidance for Unguided {
    fn weight(&self, _x: usize, _y: usize, _z: usize, _variant: usize) -> f64 {
        1.0
    }
}

impl<F> Guidance for F
where
    F: Fn(usize, usize, usize, usize) -> f64,
{
    fn weight(&self, x: usize, y: usize, z: usize, variant: usize) -> f64 {
        self(x, y, z, variant)
    }
}

/// Which vertical faces of a variant carry the surface tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SurfaceFlags {
    up_is_air: bool,
    up_is_ground: bool,
    down_is_ground: bool,
}

/// Steers ground-like variants below a height-field surface and air-like
/// variants above it.
///
/// The target height of a column is `sample(u, v) * max(1, size_z - 1)`,
/// sampled at the column centre.
pub struct HeightBias<H> {
    field: H,
    size: GridSize,
    influence: f64,
    flags: Vec<SurfaceFlags>,
}

impl<H: HeightField> HeightBias<H> {
    /// Bias with the default `"air"` / `"ground"` tokens.
    pub fn new(field: H, size: GridSize, influence: f64, variants: &[Variant]) -> Self {
        Self::with_tokens(
            field,
            size,
            influence,
            variants,
            DEFAULT_AIR_TOKEN,
            DEFAULT_GROUND_TOKEN,
        )
    }

    pub fn with_tokens(
        field: H,
        size: GridSize,
        influence: f64,
        variants: &[Variant],
        air_token: &str,
        ground_token: &str,
    ) -> Self {
        let flags = variants
            .iter()
            .map(|v| SurfaceFlags {
                up_is_air: v.sockets.contains(Direction::Up, air_token),
                up_is_ground: v.sockets.contains(Direction::Up, ground_token),
                down_is_ground: v.sockets.contains(Direction::Down, ground_token),
            })
            .collect();
        Self {
            field,
            size,
            influence: clamp_influence(influence),
            flags,
        }
    }

    pub fn influence(&self) -> f64 {
        self.influence
    }

    /// Surface height for column `(x, y)`, in cells.
    pub fn target_height(&self, x: usize, y: usize) -> f64 {
        let u = (x as f64 + 0.5) / self.size.x.max(1) as f64;
        let v = (y as f64 + 0.5) / self.size.y.max(1) as f64;
        let sample = self.field.sample(u, v).unwrap_or(0.0);
        sample * self.size.z.saturating_sub(1).max(1) as f64
    }
}

impl<H: HeightField> Guidance for HeightBias<H> {
    fn weight(&self, x: usize, y: usize, z: usize, variant: usize) -> f64 {
        let Some(flags) = self.flags.get(variant) else {
            return 1.0;
        };
        let target = self.target_height(x, y);
        let z = z as f64;

        let multiplier = if z < target - 0.5 {
            // Below the surface.
            let mut m = 1.0;
            if flags.up_is_air {
                m *= 0.1;
            }
            if flags.up_is_ground {
                m *= 1.5;
            }
            if flags.down_is_ground {
                m *= 1.2;
            }
            m
        } else if (z - target).abs() <= 0.5 {
            // Surface layer.
            if flags.up_is_air && flags.down_is_ground {
                2.0
            } else if flags.up_is_air {
                1.5
            } else if flags.up_is_ground {
                0.6
            } else {
                1.0
            }
        } else if flags.up_is_air {
            0.15 * 0.8
        } else {
            0.15
        };

        1.0 + (multiplier - 1.0) * self.influence
    }
}

/// Clamp a guidance influence into `[0, MAX_INFLUENCE]`. Non-finite input becomes 1.0.
pub fn clamp_influence(influence: f64) -> f64 {
    if influence.is_finite() {
        influence.clamp(0.0, MAX_INFLUENCE)
    } else {
        1.0
    }
}
