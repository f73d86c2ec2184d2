//! Scripted placement guidance.
//!
//! ```lua
//! -- x, y, z are 0-based cell coordinates; variant indexes `variants` (1-based).
//! function guidance(x, y, z, variant)
//!     local v = variants[variant]
//!     if z == 0 and v.sockets.UP[1] == "grass" then return 3.0 end
//!     return 1.0
//! end
//! ```
//!
//! Globals visible to the script:
//! - `variants`: `{ name, base, rotation, weight, sockets = { EAST = {...}, ... } }` per variant
//! - `size`: `{ x, y, z }`
//!
//! A script error or a non-numeric return value scores 1.0. The first
//! failure is logged as a warning, later ones at debug level.

use crate::{read_script, ScriptError};
use mlua::{Function, Lua, Table, Value};
use std::cell::Cell;
use std::path::Path;
use terrain_core::{Direction, GridSize, Guidance, Variant};
use tracing::{debug, warn};

const ENTRY_POINT: &str = "guidance";

pub struct LuaGuidance {
    // Keeps the state that owns `function` alive.
    _lua: Lua,
    function: Function,
    failures: Cell<usize>,
}

impl LuaGuidance {
    pub fn new(source: &str, variants: &[Variant], size: GridSize) -> Result<Self, ScriptError> {
        let lua = Lua::new();
        install_globals(&lua, variants, size)?;
        lua.load(source).set_name("guidance").exec()?;

        let function = match lua.globals().get::<Value>(ENTRY_POINT)? {
            Value::Function(f) => f,
            _ => return Err(ScriptError::MissingFunction(ENTRY_POINT)),
        };
        Ok(Self {
            _lua: lua,
            function,
            failures: Cell::new(0),
        })
    }

    pub fn from_file(
        path: impl AsRef<Path>,
        variants: &[Variant],
        size: GridSize,
    ) -> Result<Self, ScriptError> {
        let source = read_script(path.as_ref())?;
        Self::new(&source, variants, size)
    }

    /// Number of calls that fell back to 1.0.
    pub fn failures(&self) -> usize {
        self.failures.get()
    }

    fn degrade(&self, x: usize, y: usize, z: usize, variant: usize, reason: &str) -> f64 {
        let count = self.failures.get() + 1;
        self.failures.set(count);
        if count == 1 {
            warn!(x, y, z, variant, reason, "guidance script failed, using 1.0");
        } else {
            debug!(x, y, z, variant, reason, "guidance script failed, using 1.0");
        }
        1.0
    }
}

impl Guidance for LuaGuidance {
    fn weight(&self, x: usize, y: usize, z: usize, variant: usize) -> f64 {
        match self.function.call::<Value>((x, y, z, variant + 1)) {
            Ok(Value::Number(n)) => n,
            Ok(Value::Integer(i)) => i as f64,
            Ok(other) => {
                let reason = format!("returned {}", other.type_name());
                self.degrade(x, y, z, variant, &reason)
            }
            Err(e) => self.degrade(x, y, z, variant, &e.to_string()),
        }
    }
}

fn install_globals(lua: &Lua, variants: &[Variant], size: GridSize) -> mlua::Result<()> {
    let list = lua.create_table()?;
    for (i, v) in variants.iter().enumerate() {
        list.set(i + 1, variant_table(lua, v)?)?;
    }
    lua.globals().set("variants", list)?;

    let dims = lua.create_table()?;
    dims.set("x", size.x)?;
    dims.set("y", size.y)?;
    dims.set("z", size.z)?;
    lua.globals().set("size", dims)?;
    Ok(())
}

fn variant_table(lua: &Lua, variant: &Variant) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.set("name", variant.name.as_str())?;
    table.set("base", variant.base + 1)?;
    table.set("rotation", variant.rotation)?;
    table.set("weight", variant.weight)?;

    let sockets = lua.create_table()?;
    for dir in Direction::ALL {
        let tokens: Vec<&str> = variant.sockets.get(dir).iter().map(String::as_str).collect();
        sockets.set(dir.name(), tokens)?;
    }
    table.set("sockets", sockets)?;
    Ok(table)
}
