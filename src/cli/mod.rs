//! Command-line parsing for the LORAN-C grid generator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the field/contour code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "loran-grid", version, about = "LORAN-C hyperbolic grid generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a region's grid and write it as GeoJSON.
    Generate(GenerateArgs),
    /// List the regions and station pairs a config defines.
    Regions(RegionsArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Grid configuration JSON (chains, regions, output settings).
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: PathBuf,

    /// Region name to generate (must exist in the config).
    #[arg(short = 'r', long)]
    pub region: String,

    /// Output GeoJSON path.
    #[arg(short = 'o', long, value_name = "GEOJSON")]
    pub output: PathBuf,

    /// Override the config's coordinate precision (decimal places).
    #[arg(long)]
    pub precision: Option<u32>,

    /// Skip label features in the output.
    #[arg(long)]
    pub no_labels: bool,
}

#[derive(Debug, Parser)]
pub struct RegionsArgs {
    /// Grid configuration JSON.
    #[arg(short = 'c', long, value_name = "JSON")]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_args_parse() {
        let cli = Cli::parse_from([
            "loran-grid",
            "generate",
            "-c",
            "grid.json",
            "-r",
            "northeast",
            "-o",
            "out/northeast.geojson",
            "--no-labels",
        ]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.region, "northeast");
        assert!(args.no_labels);
        assert_eq!(args.precision, None);
    }

    #[test]
    fn regions_subcommand_parses() {
        let cli = Cli::parse_from(["loran-grid", "regions", "--config", "grid.json"]);
        assert!(matches!(cli.command, Command::Regions(_)));
    }
}
