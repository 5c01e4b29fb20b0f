//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the grid configuration
//! - runs the field/contour pipeline for the requested region
//! - writes the GeoJSON output
//! - prints a run summary

use clap::Parser;

use crate::cli::{Cli, Command, GenerateArgs, RegionsArgs};
use crate::error::GridError;

/// Entry point for the `loran-grid` binary.
pub fn run() -> Result<(), GridError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => handle_generate(args),
        Command::Regions(args) => handle_regions(args),
    }
}

fn handle_generate(args: GenerateArgs) -> Result<(), GridError> {
    let mut config = crate::io::load_config(&args.config)?;
    if let Some(precision) = args.precision {
        config.output.coordinate_precision = precision;
    }
    if args.no_labels {
        config.output.include_labels = false;
    }

    let result = crate::grid::generate_region_grid(&config, &args.region)?;
    let geojson = crate::io::grid_result_to_geojson(&result, &config.output);
    crate::io::write_geojson(&args.output, &geojson)?;

    println!(
        "{}: {} lines, {} labels -> {}",
        result.region_name,
        result.lines.len(),
        result.labels.len(),
        args.output.display()
    );
    if result.stats.pairs_skipped > 0 {
        println!(
            "warning: skipped {} pair(s) with degenerate geometry",
            result.stats.pairs_skipped
        );
    }
    if result.stats.empty_td_values > 0 {
        println!(
            "note: {} TD value(s) produced no line ({} fragment(s) filtered)",
            result.stats.empty_td_values, result.stats.lines_dropped
        );
    }
    Ok(())
}

fn handle_regions(args: RegionsArgs) -> Result<(), GridError> {
    let config = crate::io::load_config(&args.config)?;
    for (name, region) in &config.regions {
        println!("{name} [{}]", region.display_name);
        for pair in &region.pairs {
            let gri = config
                .chains
                .get(&pair.chain_id)
                .map(|c| c.gri.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "  {} (family {}, GRI {gri})",
                pair.pair_id(),
                pair.family
            );
        }
    }
    Ok(())
}
