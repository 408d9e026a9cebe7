//! Lumen - render a scene description to an image file.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbImage;
use lumen_renderer::{render, RenderConfig};
use lumen_scene::load_scene;

/// Render a scene description with the Lumen ray tracer.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
struct Args {
    /// Scene description file
    scene: PathBuf,

    /// Output image; the format follows the extension
    #[arg(short, long, value_name = "PATH", default_value = "output.png")]
    output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Anti-aliasing samples per pixel axis
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum reflection/refraction depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Seed for sample jitter
    #[arg(long)]
    seed: Option<u64>,

    /// JSON render configuration; flags override its values
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    /// Defaults, then the scene's `aa`, then the config file, then flags.
    fn render_config(&self, scene_samples: Option<u32>) -> Result<RenderConfig> {
        let mut config = RenderConfig::default();
        if let Some(samples) = scene_samples {
            config.samples_per_axis = samples;
        }

        if let Some(path) = &self.config {
            config = merge_config_file(config, path)?;
        }

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples_per_axis = samples;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        Ok(config)
    }
}

/// Read a JSON config. Fields it leaves out keep their defaults, except the
/// sample count, which keeps the scene's value.
fn merge_config_file(base: RenderConfig, path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(base, &text).with_context(|| format!("Invalid config {}", path.display()))
}

fn parse_config(base: RenderConfig, text: &str) -> Result<RenderConfig> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let sets_samples = value.get("samples_per_axis").is_some();
    let mut config: RenderConfig = serde_json::from_value(value)?;
    if !sets_samples {
        config.samples_per_axis = base.samples_per_axis;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    log::info!("Starting Lumen");

    let loaded = load_scene(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    let config = args.render_config(loaded.samples_per_axis)?;
    log::info!(
        "Scene: {} surfaces, {} lights",
        loaded.scene.surfaces().len(),
        loaded.scene.light_count()
    );

    let start = Instant::now();
    let film = render(&loaded.scene, &config).context("Render failed")?;
    log::info!("Rendered {}x{} in {:.2?}", film.width(), film.height(), start.elapsed());

    let image = RgbImage::from_raw(film.width(), film.height(), film.to_rgb8())
        .context("Film buffer does not match its dimensions")?;
    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Wrote {}", args.output.display());

    Ok(())
}
