//! Viewer for the lumen engine.
//!
//! Picks one render mode for the process lifetime, loads its assets and
//! drives the window until Escape or close.

mod app;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use lumen_engine::device::DeviceInit;
use lumen_engine::frame::RendererConfig;
use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::mode::RenderMode;
use lumen_engine::window::{Runtime, RuntimeConfig};
use lumen_engine::world::GridMap;

use app::ViewerApp;

#[derive(Debug, Parser)]
#[command(name = "lumen", about = "GPU compute renderer: rasterizer, raycaster or raytracer")]
pub struct Cli {
    /// Render mode.
    #[arg(default_value = "raytracer")]
    pub mode: RenderMode,

    /// OBJ model to load (rasterizer/raytracer). Repeatable.
    #[arg(long = "model")]
    pub models: Vec<PathBuf>,

    /// Texture for the model at the same position in `--model`.
    #[arg(long = "texture")]
    pub textures: Vec<PathBuf>,

    /// Grid map text file (raycaster). Defaults to the built-in map.
    #[arg(long)]
    pub map: Option<PathBuf>,

    /// Sprite instance file (raycaster). Defaults to a small built-in set.
    #[arg(long)]
    pub sprites: Option<PathBuf>,

    /// Directory holding the raycaster's wall and sprite textures.
    #[arg(long, default_value = "assets")]
    pub asset_dir: PathBuf,

    /// Kernel source overriding the one shipped with the engine.
    #[arg(long)]
    pub kernel: Option<PathBuf>,

    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Keep the OS cursor visible and free.
    #[arg(long)]
    pub no_grab: bool,

    /// Advance the clock by this many seconds per frame instead of wall time.
    #[arg(long)]
    pub fixed_dt: Option<f32>,

    /// Log filter, `env_logger` syntax.
    #[arg(long)]
    pub log: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..LoggingConfig::default()
    });

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut renderer = RendererConfig::new(cli.mode);
    renderer.kernel_path = cli.kernel.clone();

    if let Some(path) = &cli.map {
        let map = GridMap::load(path).with_context(|| format!("failed to load map {}", path.display()))?;
        renderer.grid_map = Arc::new(map);
    }

    let runtime = RuntimeConfig {
        title: format!("lumen ({})", cli.mode),
        width: cli.width,
        height: cli.height,
        grab_cursor: !cli.no_grab,
        fixed_dt: cli.fixed_dt,
    };

    log::info!("starting {} at {}x{}", cli.mode, cli.width, cli.height);
    let app = ViewerApp::new(cli);
    Runtime::run(runtime, DeviceInit::default(), renderer, app)
}
