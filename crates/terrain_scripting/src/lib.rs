//! Lua adapters for terrain generation.
//!
//! - [`LuaGuidance`]: a script-defined `guidance(x, y, z, variant)` function
//! - [`load_tiles_from_lua`]: a script that returns a tile list

pub mod guidance;
pub mod tiles;

pub use guidance::LuaGuidance;
pub use tiles::{load_tiles_from_lua, load_tiles_from_lua_file};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Lua failures are kept as text; `mlua::Error` is neither `Send` nor `Sync`.
    #[error("lua error: {0}")]
    Lua(String),
    #[error("script does not define a global function `{0}`")]
    MissingFunction(&'static str),
    #[error("invalid tile table: {0}")]
    InvalidTile(String),
    #[error(transparent)]
    Tileset(#[from] terrain_core::TilesetError),
}

impl From<mlua::Error> for ScriptError {
    fn from(err: mlua::Error) -> Self {
        ScriptError::Lua(err.to_string())
    }
}

pub(crate) fn read_script(path: &std::path::Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })
}
