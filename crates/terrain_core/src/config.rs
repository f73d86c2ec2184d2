//! Generation settings loaded from JSON.
//!
//! Every field is optional in the file; missing fields take the defaults
//! below. `validate()` rejects values the generator cannot run with and
//! clamps the ones it can.

use crate::guidance::{clamp_influence, DEFAULT_AIR_TOKEN, DEFAULT_GROUND_TOKEN};
use crate::wfc::GridSize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 42;
pub const MAX_REPAIR_PASSES: usize = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("grid size must be positive in every dimension, got {x}x{y}x{z}")]
    InvalidSize { x: usize, y: usize, z: usize },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
}

/// Height-map guidance settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapConfig {
    pub path: PathBuf,
    /// Strength of the bias, clamped to `[0, 5]`
    pub influence: f64,
    pub air_token: String,
    pub ground_token: String,
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            influence: 1.0,
            air_token: DEFAULT_AIR_TOKEN.to_string(),
            ground_token: DEFAULT_GROUND_TOKEN.to_string(),
        }
    }
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    /// `None` seeds from entropy.
    pub seed: Option<u64>,
    pub repair_passes: usize,
    pub max_iterations: Option<usize>,
    /// World units per cell, used for placement positions.
    pub cell_size: f32,
    pub heightmap: Option<HeightmapConfig>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            size_x: 8,
            size_y: 8,
            size_z: 1,
            seed: Some(DEFAULT_SEED),
            repair_passes: 1,
            max_iterations: None,
            cell_size: 2.0,
            heightmap: None,
        }
    }
}

impl GenerationConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn size(&self) -> GridSize {
        GridSize::new(self.size_x, self.size_y, self.size_z)
    }

    /// Check dimensions and cell size, clamp repair passes and influence.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if !self.size().is_valid() {
            return Err(ConfigError::InvalidSize {
                x: self.size_x,
                y: self.size_y,
                z: self.size_z,
            });
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        self.repair_passes = self.repair_passes.min(MAX_REPAIR_PASSES);
        if let Some(hm) = self.heightmap.as_mut() {
            hm.influence = clamp_influence(hm.influence);
        }
        Ok(self)
    }
}
