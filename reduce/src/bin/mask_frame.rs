//! Synthetic frame masking tool.
//!
//! Builds a seeded Gaussian frame, plants hot pixels and non-finite values,
//! applies a mask recipe and reports how many pixels were rejected and how
//! many of the planted defects the mask caught.

use anyhow::{Context, Result};
use clap::Parser;
use reduce::{
    diagnostics::DiagnosticsConfig,
    mask::{masked_coordinates, masked_count, SigmaMultiple},
    recipe::{Combination, MaskRecipe, MaskStep},
    synthetic::{inject_defects, simple_normal_array, DefectPlan},
};
use serde::Serialize;
use std::{collections::HashSet, fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mask defects in a synthetic frame with a configurable recipe"
)]
struct Args {
    #[arg(long, default_value = "256", help = "Frame width in pixels")]
    width: usize,

    #[arg(long, default_value = "256", help = "Frame height in pixels")]
    height: usize,

    #[arg(long, default_value = "1000.0", help = "Mean background level")]
    mean: f64,

    #[arg(long, default_value = "10.0", help = "Background noise standard deviation")]
    std_dev: f64,

    #[arg(long, default_value = "0", help = "Random seed for frame and defects")]
    seed: u64,

    #[arg(long, default_value = "20", help = "Number of hot pixels to plant")]
    hot_pixels: usize,

    #[arg(long, default_value = "5", help = "Number of NaN pixels to plant")]
    nan_pixels: usize,

    #[arg(long, default_value = "5", help = "Number of infinite pixels to plant")]
    inf_pixels: usize,

    #[arg(
        short = 'r',
        long,
        help = "JSON mask recipe; defaults to invalid values OR sigma clipping"
    )]
    recipe: Option<PathBuf>,

    #[arg(
        long,
        default_value = "5.0",
        help = "Sigma multiple for the default recipe",
        conflicts_with = "recipe"
    )]
    sigma: f64,

    #[arg(
        long,
        default_value = "3",
        help = "Sigma clipping iterations for the default recipe",
        conflicts_with = "recipe"
    )]
    iterations: usize,

    #[arg(short = 'o', long, help = "Write masked coordinates as JSON to this file")]
    output: Option<PathBuf>,

    #[arg(long, help = "Suppress masking diagnostics")]
    silent: bool,

    #[arg(long, default_value = "info", help = "Log filter directive")]
    log_level: String,
}

#[derive(Serialize)]
struct MaskReport {
    width: usize,
    height: usize,
    seed: u64,
    masked_count: usize,
    planted_count: usize,
    caught_count: usize,
    /// `(column, row)` pairs in row-major order.
    masked: Vec<(usize, usize)>,
}

fn default_recipe(sigma: f64, iterations: usize) -> MaskRecipe {
    MaskRecipe::new(
        Combination::Or,
        vec![
            MaskStep::InvalidAll,
            MaskStep::SigmaValue {
                sigma: SigmaMultiple::Symmetric(sigma),
                iterations,
            },
        ],
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    DiagnosticsConfig {
        silent: args.silent,
        level: args.log_level.clone(),
    }
    .init();

    info!("Synthetic Frame Masking");
    info!("=======================");

    let recipe = match &args.recipe {
        Some(path) => MaskRecipe::load_from_file(path)
            .with_context(|| format!("Failed to load mask recipe: {path:?}"))?,
        None => default_recipe(args.sigma, args.iterations),
    };
    info!(
        "Recipe: {} steps combined with {:?}",
        recipe.steps.len(),
        recipe.combine
    );

    let mut frame = simple_normal_array(
        (args.height, args.width),
        args.mean,
        args.std_dev,
        args.seed,
    )
    .context("Invalid background noise parameters")?;

    let plan = DefectPlan {
        hot_pixels: args.hot_pixels,
        nan_pixels: args.nan_pixels,
        inf_pixels: args.inf_pixels,
        ..DefectPlan::default()
    };
    let planted = inject_defects(&mut frame, &plan, args.seed.wrapping_add(1));
    info!(
        "Frame {}x{}: planted {} hot, {} NaN, {} infinite pixels",
        args.width,
        args.height,
        planted.hot.len(),
        planted.nan.len(),
        planted.infinite.len()
    );

    let mask = recipe.apply(&frame).context("Failed to build mask")?;

    let masked = masked_coordinates(&mask);
    let masked_set: HashSet<(usize, usize)> = masked.iter().copied().collect();
    let planted_all = planted.all();
    let caught = planted_all
        .iter()
        .filter(|&position| masked_set.contains(position))
        .count();

    let total = mask.len().max(1);
    let count = masked_count(&mask);
    info!(
        "Masked {} of {} pixels ({:.3}%)",
        count,
        mask.len(),
        100.0 * count as f64 / total as f64
    );
    info!("Caught {} of {} planted defects", caught, planted_all.len());
    if caught < planted_all.len() {
        warn!(
            "{} planted defects were not masked",
            planted_all.len() - caught
        );
    }

    if let Some(path) = &args.output {
        let report = MaskReport {
            width: args.width,
            height: args.height,
            seed: args.seed,
            masked_count: count,
            planted_count: planted_all.len(),
            caught_count: caught,
            masked,
        };
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report: {path:?}"))?;
        info!("Report written to {:?}", path);
    }

    Ok(())
}
