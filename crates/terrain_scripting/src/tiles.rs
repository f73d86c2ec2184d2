//! Tile lists produced by Lua scripts.
//!
//! The chunk returns an array of tile tables using the same fields as JSON
//! tilesets:
//!
//! ```lua
//! local tiles = {}
//! for _, name in ipairs({ "grass", "sand" }) do
//!     tiles[#tiles + 1] = { name = name, sockets = { UP = "air", DOWN = { "ground" } } }
//! end
//! tiles[#tiles + 1] = { name = "road", weight = 2, allow_rotation = false,
//!                       sockets = { EAST = "road", WEST = "road" } }
//! return tiles
//! ```

use crate::{read_script, ScriptError};
use mlua::{Lua, Table, Value};
use std::path::Path;
use terrain_core::tileset::{tiles_from_specs, FlagValue, SocketValue, TileSpec};
use terrain_core::Tile;
use tracing::debug;

/// Run `source` and convert the returned array into tiles.
pub fn load_tiles_from_lua(source: &str) -> Result<Vec<Tile>, ScriptError> {
    let lua = Lua::new();
    let list: Table = lua.load(source).set_name("tiles").eval()?;

    let mut specs = Vec::new();
    for (i, entry) in list.sequence_values::<Value>().enumerate() {
        match entry? {
            Value::Table(table) => specs.push(tile_spec(&table)?),
            other => {
                return Err(ScriptError::InvalidTile(format!(
                    "entry {} is a {}, expected a table",
                    i + 1,
                    other.type_name()
                )))
            }
        }
    }

    let tiles = tiles_from_specs(specs)?;
    debug!(tiles = tiles.len(), "loaded tiles from lua");
    Ok(tiles)
}

pub fn load_tiles_from_lua_file(path: impl AsRef<Path>) -> Result<Vec<Tile>, ScriptError> {
    let source = read_script(path.as_ref())?;
    load_tiles_from_lua(&source)
}

fn tile_spec(table: &Table) -> Result<TileSpec, ScriptError> {
    let mut spec = TileSpec {
        name: table.get::<Option<String>>("name")?,
        weight: table.get::<Option<f64>>("weight")?,
        ..Default::default()
    };

    spec.allow_rotation = match table.get::<Value>("allow_rotation")? {
        Value::Nil => None,
        Value::Boolean(b) => Some(FlagValue::Bool(b)),
        Value::Integer(i) => Some(FlagValue::Number(i as f64)),
        Value::Number(n) => Some(FlagValue::Number(n)),
        Value::String(s) => Some(FlagValue::Text(s.to_str()?.to_string())),
        other => {
            return Err(ScriptError::InvalidTile(format!(
                "allow_rotation is a {}",
                other.type_name()
            )))
        }
    };

    if let Some(sockets) = table.get::<Option<Table>>("sockets")? {
        for pair in sockets.pairs::<String, Value>() {
            let (dir, value) = pair?;
            let value = match value {
                Value::String(s) => SocketValue::Text(s.to_str()?.to_string()),
                Value::Table(list) => SocketValue::List(
                    list.sequence_values::<String>()
                        .collect::<mlua::Result<Vec<_>>>()?,
                ),
                other => {
                    return Err(ScriptError::InvalidTile(format!(
                        "socket {dir} is a {}",
                        other.type_name()
                    )))
                }
            };
            spec.sockets.insert(dir, value);
        }
    }
    Ok(spec)
}
