//! Tileset loading from JSON and XML.
//!
//! Both formats describe the same thing: a list of named tiles with socket
//! tokens per face, an optional weight and an optional rotation flag.
//!
//! JSON:
//! ```json
//! { "tiles": [
//!     { "name": "road", "weight": 2.0, "allow_rotation": true,
//!       "sockets": { "EAST": "road", "WEST": ["road"], "UP": "NA" } }
//! ] }
//! ```
//!
//! XML:
//! ```xml
//! <tileset><tiles>
//!   <tile name="road" weight="2" rotate="yes" east="road" WFC_W="road" up="NA"/>
//! </tiles></tileset>
//! ```
//!
//! Faces that are not mentioned default to the wildcard.

use crate::direction::Direction;
use crate::tile::{parse_flag, tokenize, SocketSet, Tile};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TilesetError {
    #[error("failed to read tileset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid tileset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid tileset XML: {0}")]
    Xml(String),
    #[error("tile #{0} has no name")]
    MissingName(usize),
    #[error("duplicate tile name {0:?}")]
    DuplicateName(String),
    #[error("tile {tile:?} has a socket for unknown direction {direction:?}")]
    UnknownDirection { tile: String, direction: String },
    #[error("tile {tile:?} has an empty socket list for {direction:?}")]
    EmptySocketList { tile: String, direction: String },
    #[error("unsupported tileset format: {0}")]
    UnsupportedFormat(PathBuf),
}

/// A face value: either comma-separated text or a token list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SocketValue {
    Text(String),
    List(Vec<String>),
}

impl SocketValue {
    /// Tokens for this face. List items are taken whole, never split on commas.
    ///
    /// `None` for a list with no non-blank items.
    pub fn tokens(&self) -> Option<SocketSet> {
        match self {
            SocketValue::Text(text) => Some(tokenize(text)),
            SocketValue::List(items) => {
                let set: SocketSet = items
                    .iter()
                    .map(|item| item.trim())
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect();
                (!set.is_empty()).then_some(set)
            }
        }
    }
}

/// Rotation flag as written by hand: a boolean, a number or text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FlagValue {
    pub fn as_bool(&self) -> bool {
        match self {
            FlagValue::Bool(b) => *b,
            FlagValue::Number(n) => *n != 0.0,
            FlagValue::Text(t) => parse_flag(t),
        }
    }
}

/// Unvalidated tile description shared by every tile source.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TileSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sockets: BTreeMap<String, SocketValue>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default, alias = "rotate")]
    pub allow_rotation: Option<FlagValue>,
}

impl TileSpec {
    fn into_tile(self, index: usize) -> Result<Tile, TilesetError> {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Err(TilesetError::MissingName(index)),
        };
        let mut tile = Tile::new(name.clone())
            .with_weight(self.weight.unwrap_or(1.0))
            .with_rotation(self.allow_rotation.map_or(true, |f| f.as_bool()));
        for (key, value) in &self.sockets {
            let dir = Direction::from_name(key).ok_or_else(|| TilesetError::UnknownDirection {
                tile: name.clone(),
                direction: key.clone(),
            })?;
            let tokens = value.tokens().ok_or_else(|| TilesetError::EmptySocketList {
                tile: name.clone(),
                direction: key.clone(),
            })?;
            tile.sockets.set(dir, tokens);
        }
        Ok(tile)
    }
}

#[derive(Debug, Deserialize)]
struct TilesetFile {
    #[serde(default)]
    tiles: Vec<TileSpec>,
}

/// Validate raw specs into tiles. Names must be present and unique.
pub fn tiles_from_specs(specs: Vec<TileSpec>) -> Result<Vec<Tile>, TilesetError> {
    let mut seen = HashSet::new();
    let mut tiles = Vec::with_capacity(specs.len());
    for (index, spec) in specs.into_iter().enumerate() {
        let tile = spec.into_tile(index)?;
        if !seen.insert(tile.name.clone()) {
            return Err(TilesetError::DuplicateName(tile.name));
        }
        tiles.push(tile);
    }
    Ok(tiles)
}

pub fn from_json_str(json: &str) -> Result<Vec<Tile>, TilesetError> {
    let file: TilesetFile = serde_json::from_str(json)?;
    tiles_from_specs(file.tiles)
}

pub fn from_xml_str(xml: &str) -> Result<Vec<Tile>, TilesetError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut specs = Vec::new();
    let mut in_tiles = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"tiles" => in_tiles = true,
                b"tile" if in_tiles => specs.push(parse_tile_element(e)?),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if in_tiles && e.name().as_ref() == b"tile" {
                    specs.push(parse_tile_element(e)?);
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"tiles" {
                    in_tiles = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TilesetError::Xml(e.to_string())),
            _ => {}
        }
    }

    tiles_from_specs(specs)
}

fn parse_tile_element(e: &BytesStart) -> Result<TileSpec, TilesetError> {
    let mut spec = TileSpec::default();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| TilesetError::Xml(format!("attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| TilesetError::Xml(format!("invalid UTF-8 in attribute key: {e}")))?;
        let value = attr
            .unescape_value()
            .map_err(|e| TilesetError::Xml(format!("invalid attribute value: {e}")))?;
        match key {
            "name" => spec.name = Some(value.to_string()),
            "weight" => spec.weight = Some(value.trim().parse().unwrap_or(1.0)),
            "rotate" | "allow_rotation" => {
                spec.allow_rotation = Some(FlagValue::Text(value.to_string()))
            }
            other if Direction::from_name(other).is_some() => {
                spec.sockets
                    .insert(other.to_string(), SocketValue::Text(value.to_string()));
            }
            _ => {}
        }
    }
    Ok(spec)
}

/// Load a tileset file, picking the parser from the extension.
pub fn load_tileset(path: impl AsRef<Path>) -> Result<Vec<Tile>, TilesetError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<Vec<Tile>, TilesetError> = match ext.as_deref() {
        Some("json") => from_json_str,
        Some("xml") => from_xml_str,
        _ => return Err(TilesetError::UnsupportedFormat(path.to_path_buf())),
    };
    let text = std::fs::read_to_string(path).map_err(|source| TilesetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tiles = parse(&text)?;
    debug!(path = %path.display(), tiles = tiles.len(), "loaded tileset");
    Ok(tiles)
}
