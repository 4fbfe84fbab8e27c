//! `pyre`: render one of the built-in scenes to an image file.

mod progress;
mod scenes;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use pyre_core::save_bgr8;
use pyre_renderer::{render, RenderConfig, RenderProgress, Scene, ToneMap};
use rand::rngs::StdRng;
use rand::SeedableRng;

use progress::ProgressReporter;
use scenes::SceneName;

/// Width over height when neither a flag nor a config file sets it.
const DEFAULT_ASPECT: f32 = 16.0 / 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ToneMapArg {
    Aces,
    Filmic,
    Clamp,
}

impl From<ToneMapArg> for ToneMap {
    fn from(arg: ToneMapArg) -> Self {
        match arg {
            ToneMapArg::Aces => ToneMap::Aces,
            ToneMapArg::Filmic => ToneMap::Filmic,
            ToneMapArg::Clamp => ToneMap::Clamp,
        }
    }
}

/// Monte Carlo path tracer
#[derive(Parser, Debug)]
#[command(name = "pyre", author, version, about)]
struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value_t = SceneName::Hdr)]
    scene: SceneName,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Width over height; the height is derived from the width
    #[arg(long)]
    aspect: Option<f32>,

    /// Samples per pixel
    #[arg(long)]
    samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    max_depth: Option<u32>,

    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seed for reproducible renders
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum)]
    tone_map: Option<ToneMapArg>,

    /// Image used by the textured globes
    #[arg(long, default_value = "earth8k+.jpg")]
    texture: PathBuf,

    /// JSON render configuration; flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "render.bmp")]
    output: PathBuf,
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

/// The config file (or defaults) with command-line overrides applied.
fn resolve_config(args: &Args) -> Result<RenderConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };

    let (file_width, file_height) = (config.width, config.height);
    if let Some(width) = args.width {
        config.width = width;
    }

    match (args.aspect, &args.config) {
        (Some(aspect), _) => {
            ensure!(aspect.is_finite() && aspect > 0.0, "aspect ratio must be positive, got {}", aspect);
            config.height = height_for(config.width, aspect);
        }
        (None, None) => config.height = height_for(config.width, DEFAULT_ASPECT),
        // A new width keeps the file's proportions
        (None, Some(_)) if args.width.is_some() && file_width > 0 => {
            let scaled = u64::from(config.width) * u64::from(file_height) + u64::from(file_width) / 2;
            config.height = u32::try_from(scaled / u64::from(file_width))
                .context("scaled height overflows")?
                .max(1);
        }
        (None, Some(_)) => {}
    }

    if let Some(samples) = args.samples {
        config.samples_per_pixel = samples;
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(tone_map) = args.tone_map {
        config.tone_map = tone_map.into();
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    config.validate().context("invalid render configuration")?;
    Ok(config)
}

fn height_for(width: u32, aspect: f32) -> u32 {
    ((width as f32 / aspect).round() as u32).max(1)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    let start = Instant::now();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let setup = scenes::build(args.scene, config.aspect_ratio(), &args.texture, &mut rng)
        .context("failed to assemble scene")?;
    let scene = Scene::build(setup.objects, setup.camera, setup.background, &mut rng)
        .context("failed to build scene")?;

    let progress = Arc::new(RenderProgress::for_config(&config));
    let reporter = ProgressReporter::spawn(Arc::clone(&progress)).context("failed to start progress reporter")?;
    let rendered = render(&scene, &config, &progress);
    reporter.finish();
    let image = rendered.context("render failed")?;

    save_bgr8(&args.output, image.width, image.height, image.as_bgr())
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        "Total render time {:.2?}, saved {}",
        start.elapsed(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("pyre").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.scene, SceneName::Hdr);

        let config = resolve_config(&args).unwrap();
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert_eq!(config.tone_map, ToneMap::Aces);
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--scene", "cornell", "--width", "600", "--aspect", "1", "--samples", "8",
            "--max-depth", "5", "--threads", "2", "--seed", "11", "--tone-map", "filmic",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(args.scene, SceneName::Cornell);
        assert_eq!((config.width, config.height), (600, 600));
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.threads, Some(2));
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.tone_map, ToneMap::Filmic);
    }

    #[test]
    fn test_config_file_keeps_its_height() {
        let path = std::env::temp_dir().join(format!("pyre-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 400, "height": 300, "samples_per_pixel": 3 }"#).unwrap();

        let args = parse(&["--config", path.to_str().unwrap(), "--samples", "9"]);
        let config = resolve_config(&args).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((config.width, config.height), (400, 300));
        assert_eq!(config.samples_per_pixel, 9);
    }

    #[test]
    fn test_width_flag_keeps_config_proportions() {
        let path = std::env::temp_dir().join(format!("pyre-config-wide-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "width": 400, "height": 300 }"#).unwrap();

        let config = resolve_config(&parse(&["--config", path.to_str().unwrap(), "--width", "800"])).unwrap();
        let squared = resolve_config(&parse(&[
            "--config", path.to_str().unwrap(), "--width", "800", "--aspect", "1",
        ]))
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!((squared.width, squared.height), (800, 800));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        assert!(resolve_config(&parse(&["--samples", "0"])).is_err());
        assert!(resolve_config(&parse(&["--aspect", "0"])).is_err());
        assert!(resolve_config(&parse(&["--threads", "0"])).is_err());
        assert!(Args::try_parse_from(["pyre", "--scene", "teapot"]).is_err());
    }
}
