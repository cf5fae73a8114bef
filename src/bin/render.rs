use std::{fs, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use hypertile::{
    apply_display_scale, extract_rgb_composite, format_duration,
    vis::plotting::png::{
        class_map::class_map_plot,
        panels::image_reference_plot,
        spectral::{augmentation_plot, spectral_curve_plot},
    },
    Config, SpectralNoise, TileCollection, TileLayout,
};
use ndarray::{Array2, Axis, Ix2};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt};

#[derive(Parser, Debug)]
#[command(name = "hypertile-render")]
#[command(about = "Render spectral curves, augmentations and class maps of one hyperspectral tile")]
struct Args {
    /// Imagery array (.npy, f32)
    #[arg(long)]
    imagery: PathBuf,

    /// Reference labels (.npy, i64)
    #[arg(long)]
    reference: PathBuf,

    /// Config file (.toml), defaults are used if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Index of the tile to render
    #[arg(long, default_value_t = 0)]
    tile: usize,

    /// Also render a band composite next to the reference map, reading the
    /// imagery as [tile, channel, height, width]
    #[arg(long)]
    composite: bool,

    /// Output directory
    #[arg(long, default_value = "./figures")]
    out: PathBuf,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Rendering failed: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    setup_logging().context("Failed to set up logging")?;
    let args = Args::parse();
    let started = Instant::now();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let tiles = TileCollection::from_npy(&args.imagery, &args.reference)
        .context("Failed to load tiles")?;
    info!(
        "Loaded {} tiles with layout {:?} and {} channels.",
        tiles.len(),
        tiles.layout(),
        tiles.channel_count()
    );

    fs::create_dir_all(&args.out)
        .with_context(|| format!("Failed to create output directory {}", args.out.display()))?;
    let tile = args.tile;

    spectral_curve_plot(
        &tiles,
        tile,
        Some(args.out.join(format!("spectral_curve_{tile}.png")).as_path()),
        None,
        Some(config.resolution),
    )
    .context("Failed to render spectral curve")?;

    let noise = SpectralNoise {
        std_dev: config.augmentation_noise,
        seed: config.seed,
    };
    augmentation_plot(
        &tiles,
        tile,
        &noise,
        Some(args.out.join(format!("augmentation_{tile}.png")).as_path()),
        None,
    )
    .context("Failed to render augmentation comparison")?;

    match reference_raster(&tiles, tile) {
        Some(raster) => {
            class_map_plot(
                &raster,
                &config.palette,
                Some(args.out.join(format!("class_map_{tile}.png")).as_path()),
                None,
                true,
                None,
            )
            .context("Failed to render class map")?;

            if args.composite {
                let composite = extract_rgb_composite(
                    tiles.imagery(),
                    tile,
                    config.composite_bands,
                    TileLayout::Spatial,
                )
                .context("Failed to extract composite")?;
                let composite = apply_display_scale(&composite, config.composite_scale);
                image_reference_plot(
                    &composite,
                    &raster,
                    &config.palette,
                    Some(args.out.join(format!("image_reference_{tile}.png")).as_path()),
                    None,
                )
                .context("Failed to render composite")?;
            }
        }
        None => {
            if args.composite {
                warn!("Reference holds no per-pixel raster, skipping composite.");
            }
        }
    }

    info!(
        "Rendered tile {tile} into {} in {}.",
        args.out.display(),
        format_duration(started.elapsed().as_secs())
    );
    Ok(())
}

/// Reduces a tile's reference to its trailing two axes, reading index 0 of
/// any axis in between. Scalar or vector references have no raster.
fn reference_raster(tiles: &TileCollection, tile: usize) -> Option<Array2<i64>> {
    if tile >= tiles.len() {
        return None;
    }
    let mut view = tiles.reference().index_axis(Axis(0), tile);
    while view.ndim() > 2 {
        if view.len_of(Axis(0)) == 0 {
            return None;
        }
        view = view.index_axis_move(Axis(0), 0);
    }
    view.into_dimensionality::<Ix2>()
        .ok()
        .map(|raster| raster.to_owned())
}

#[tracing::instrument(level = "debug")]
fn setup_logging() -> Result<()> {
    if let Err(e) = try_setup_file_logging() {
        eprintln!("Warning: Could not set up file logging ({e}), using stdout only");
        setup_stdout_logging()?;
    }
    Ok(())
}

#[tracing::instrument(level = "debug")]
fn setup_stdout_logging() -> Result<()> {
    let subscriber = tracing_subscriber::registry().with(
        fmt::Layer::new()
            .with_writer(std::io::stdout)
            .with_ansi(true),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up stdout logging")?;

    Ok(())
}

#[tracing::instrument(level = "debug")]
fn try_setup_file_logging() -> Result<()> {
    fs::create_dir_all("./logs").context("Failed to create log directory")?;
    let file_appender = tracing_appender::rolling::daily("./logs", "hypertile.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // the writer must outlive main
    std::mem::forget(guard);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::Layer::new()
                .with_writer(std::io::stdout)
                .with_ansi(true),
        )
        .with(
            fmt::Layer::new()
                .with_writer(non_blocking)
                .with_line_number(true)
                .fmt_fields(fmt::format::PrettyFields::new())
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set up file logging")?;

    Ok(())
}
