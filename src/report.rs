//! JSON report written by the CLI.

use serde::Serialize;
use terrain_core::{GenerationResult, GridSize, RepairReport, SolverState};

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub size: GridSize,
    pub seed: Option<u64>,
    pub state: SolverState,
    pub summary: String,
    pub repair: RepairReport,
    pub variants: usize,
    pub placements: Vec<PlacedTile<'a>>,
}

#[derive(Debug, Serialize)]
pub struct PlacedTile<'a> {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub variant: &'a str,
    pub tile: &'a str,
    pub rotation: f32,
    /// World-space cell origin.
    pub position: [f32; 3],
}

impl<'a> Report<'a> {
    pub fn new(result: &'a GenerationResult, seed: Option<u64>, cell_size: f32) -> Self {
        let placements = result
            .placements
            .iter()
            .map(|p| {
                let variant = result.variant(p);
                PlacedTile {
                    x: p.x,
                    y: p.y,
                    z: p.z,
                    variant: &variant.name,
                    tile: &result.tile(p).name,
                    rotation: variant.rotation_degrees(),
                    position: p.world_position(cell_size).to_array(),
                }
            })
            .collect();
        Self {
            size: result.size,
            seed,
            state: result.state,
            summary: result.summary(),
            repair: result.repair,
            variants: result.variants.len(),
            placements,
        }
    }
}
