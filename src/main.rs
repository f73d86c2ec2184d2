//! `wfc_terrain`: fill a 3D grid from a tileset and write the placements as JSON.
//!
//! ```text
//! wfc_terrain --tileset assets/tilesets/mars.json --size 16 16 3 --seed 7 -o out.json
//! wfc_terrain --tileset tiles.xml --config gen.json --heightmap height.png --influence 2
//! wfc_terrain --tileset tiles.lua --guidance bias.lua -v
//! ```

mod report;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use report::Report;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use terrain_core::{
    load_tileset, GenerateOptions, GenerationConfig, Generator, Guidance, HeightBias,
    HeightmapConfig, ImageHeightField, PlacementEvent, StdRandom, Tile, Unguided,
};
use terrain_scripting::{load_tiles_from_lua_file, LuaGuidance};
use tracing::{info, trace, Level};

#[derive(Debug, Parser)]
#[command(author, version, about = "Socket-based 3D wave function collapse", long_about = None)]
struct Cli {
    /// Tileset file (.json, .xml or .lua)
    #[arg(short, long, value_name = "PATH")]
    tileset: PathBuf,

    /// Generation config (JSON); flags below override it
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long)]
    seed: Option<u64>,

    /// Grid size in cells
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"])]
    size: Option<Vec<usize>>,

    #[arg(long, value_name = "N")]
    repair_passes: Option<usize>,

    #[arg(long, value_name = "N")]
    max_iterations: Option<usize>,

    /// Height map image used to bias ground and air tiles
    #[arg(long, value_name = "PNG")]
    heightmap: Option<PathBuf>,

    /// Height map influence, 0 to 5
    #[arg(long)]
    influence: Option<f64>,

    /// Lua script defining `guidance(x, y, z, variant)`
    #[arg(long, value_name = "LUA", conflicts_with = "heightmap")]
    guidance: Option<PathBuf>,

    /// Report path; stdout when omitted
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = build_config(&cli)?;
    let tiles = load_tiles(&cli.tileset)?;
    let generator = Generator::new(tiles)?;
    let options = GenerateOptions::from(&config);

    let guidance: Box<dyn Guidance> = if let Some(script) = &cli.guidance {
        Box::new(
            LuaGuidance::from_file(script, generator.variants(), options.size)
                .with_context(|| format!("loading guidance script {}", script.display()))?,
        )
    } else if let Some(hm) = &config.heightmap {
        let field = ImageHeightField::load(&hm.path)?;
        Box::new(HeightBias::with_tokens(
            field,
            options.size,
            hm.influence,
            generator.variants(),
            &hm.air_token,
            &hm.ground_token,
        ))
    } else {
        Box::new(Unguided)
    };

    let mut rng = StdRandom::from_optional_seed(config.seed);
    let mut sink = |event: &PlacementEvent| {
        trace!(phase = ?event.phase, x = event.x, y = event.y, z = event.z, variant = event.variant, "placed");
        ControlFlow::Continue(())
    };
    let result = generator.run(&options, &mut rng, guidance.as_ref(), &mut sink)?;

    let report = Report::new(&result, config.seed, config.cell_size);
    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!(path = %path.display(), "wrote report");
        }
        None => println!("{json}"),
    }
    eprintln!("{} ({:?})", result.summary(), result.state);
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<GenerationConfig> {
    let mut config = match &cli.config {
        Some(path) => GenerationConfig::load(path)?,
        None => GenerationConfig::default(),
    };

    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(size) = &cli.size {
        let [x, y, z] = size.as_slice() else {
            bail!("--size takes exactly three values");
        };
        config.size_x = *x;
        config.size_y = *y;
        config.size_z = *z;
    }
    if let Some(passes) = cli.repair_passes {
        config.repair_passes = passes;
    }
    if cli.max_iterations.is_some() {
        config.max_iterations = cli.max_iterations;
    }
    if let Some(path) = &cli.heightmap {
        let hm = config.heightmap.get_or_insert_with(HeightmapConfig::default);
        hm.path = path.clone();
    }
    if let Some(influence) = cli.influence {
        match config.heightmap.as_mut() {
            Some(hm) => hm.influence = influence,
            None => bail!("--influence needs a height map"),
        }
    }
    if cli.guidance.is_some() {
        // Scripted guidance replaces the height bias from the config file.
        config.heightmap = None;
    }

    Ok(config.validate()?)
}

fn load_tiles(path: &Path) -> Result<Vec<Tile>> {
    let is_lua = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("lua"));
    let tiles = if is_lua {
        load_tiles_from_lua_file(path)?
    } else {
        load_tileset(path)?
    };
    info!(path = %path.display(), tiles = tiles.len(), "loaded tileset");
    Ok(tiles)
}
