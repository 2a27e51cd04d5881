use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use terrain_viewer::config::ViewerConfig;
use terrain_viewer::settings::ColorMode;
use terrain_viewer::viewer;

#[derive(Parser, Debug)]
#[command(name = "terrain_viewer")]
#[command(about = "Explore a wrapping terrain world served by a simulation backend")]
struct Args {
    /// JSON config file (missing keys use defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, env = "TERRAIN_API_URL")]
    api_url: Option<String>,

    /// Canvas width in pixels
    #[arg(short = 'W', long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(short = 'H', long)]
    height: Option<u32>,

    /// Initial colour mode (default, temperature, moisture, ...)
    #[arg(short = 'm', long)]
    color_mode: Option<String>,

    /// Render one frame to this PNG instead of opening a window
    #[arg(long)]
    snapshot: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    if let Some(width) = args.width {
        config.canvas_width = width;
    }
    if let Some(height) = args.height {
        config.canvas_height = height;
    }
    if let Some(mode) = &args.color_mode {
        config.settings.color_mode = ColorMode::parse_lossy(mode);
    }
    let config = config.normalized();

    println!("Backend: {}", config.api_url);
    println!("Canvas: {}x{}", config.canvas_width, config.canvas_height);

    match args.snapshot {
        Some(path) => viewer::export_snapshot(config, &path),
        None => viewer::run_viewer(config),
    }
}
