//! Socket-based 3D terrain generation with Wave Function Collapse.
//!
//! This crate provides:
//! - Tile model with per-face socket tokens and rotation variants
//! - Directional adjacency tables
//! - Greedy WFC solver with FIFO propagation and a local repair pass
//! - Height-map and closure-based placement guidance
//! - JSON/XML tileset loading and JSON generation config
//! - Placement events for downstream mesh instancing

pub mod adjacency;
pub mod config;
pub mod direction;
pub mod generate;
pub mod guidance;
pub mod heightmap;
pub mod placement;
pub mod rng;
pub mod tile;
pub mod tileset;
pub mod variant;
pub mod wfc;

pub use adjacency::AdjacencyTable;
pub use config::{ConfigError, GenerationConfig, HeightmapConfig};
pub use direction::{Direction, CARDINAL};
pub use generate::{generate, GenerateError, GenerateOptions, GenerationResult, Generator};
pub use guidance::{Guidance, HeightBias, Unguided};
pub use heightmap::{FlatHeightField, HeightField, HeightmapError, ImageHeightField};
pub use placement::{
    NullSink, Phase, Placement, PlacementEvent, PlacementRecorder, PlacementSink,
};
pub use rng::{StdRandom, WfcRng};
pub use tile::{sockets_compatible, SocketSet, Sockets, Tile, NOT_ALLOWED, WILDCARD};
pub use tileset::{load_tileset, TileSpec, TilesetError};
pub use variant::{generate_variants, rotate_sockets, Variant};
pub use wfc::{GridSize, RepairReport, Solver, SolverState};
