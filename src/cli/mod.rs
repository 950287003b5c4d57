//! CLI argument definitions for icerank.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ICE_GIT_COMMIT"),
    ", built ",
    env!("ICE_BUILD_TIMESTAMP"),
    ")"
);

/// icerank - Score, rank and classify ideas with ICE or RICE.
///
/// Start with `ice rank ideas.txt` to see ideas ordered by score, then
/// `ice classify ideas.txt` to split them into quadrants.
#[derive(Parser, Debug)]
#[command(name = "ice")]
#[command(author, version, long_version = LONG_VERSION, about = "Score, rank and classify ideas with ICE or RICE", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Directory holding config.kdl.
    /// Can also be set via ICE_CONFIG_DIR environment variable.
    #[arg(long = "config-dir", global = true, env = "ICE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse structured text lines into partial idea records
    ///
    /// Each line looks like `Title | I:2 | C:0.8 | E:1 | R:500 | T:ui,api`.
    /// Unknown or invalid tokens are dropped and reported as warnings.
    Parse {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,
    },

    /// Import a CSV table, reporting accepted and rejected rows
    Import {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Scoring model used for validation
        #[arg(short, long, value_parser = ["ice", "rice"])]
        model: Option<String>,
    },

    /// Validate records and list every violation
    Validate {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Input format (detected from the file extension by default)
        #[arg(short, long, value_parser = ["text", "csv", "json"])]
        format: Option<String>,

        /// Scoring model used for validation
        #[arg(short, long, value_parser = ["ice", "rice"])]
        model: Option<String>,
    },

    /// Rank ideas by score (highest first)
    Rank {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Input format (detected from the file extension by default)
        #[arg(short, long, value_parser = ["text", "csv", "json"])]
        format: Option<String>,

        /// Scoring model
        #[arg(short, long, value_parser = ["ice", "rice"])]
        model: Option<String>,

        /// Exponent weights as reach,impact,confidence,effort (e.g., 1,1.5,1,1)
        #[arg(short, long)]
        weights: Option<String>,
    },

    /// Classify valid ideas into Quick Wins, Big Bets, Maybes and Time Sinks
    ///
    /// Thresholds default to the median effort and impact of the valid ideas.
    Classify {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Input format (detected from the file extension by default)
        #[arg(short, long, value_parser = ["text", "csv", "json"])]
        format: Option<String>,

        /// Scoring model
        #[arg(short, long, value_parser = ["ice", "rice"])]
        model: Option<String>,

        /// Fixed effort threshold (at or below is low effort)
        #[arg(long, requires = "impact_threshold")]
        effort_threshold: Option<f64>,

        /// Fixed impact threshold (at or above is high impact)
        #[arg(long, requires = "effort_threshold")]
        impact_threshold: Option<f64>,
    },

    /// Export ideas as structured text or a ranked CSV table
    Export {
        /// Input file ("-" for stdin)
        #[arg(default_value = "-")]
        file: String,

        /// Input format (detected from the file extension by default)
        #[arg(short, long, value_parser = ["text", "csv", "json"])]
        format: Option<String>,

        /// Output format
        #[arg(long, value_parser = ["csv", "text"])]
        to: String,

        /// Decimal places for the score column
        #[arg(short, long)]
        precision: Option<u8>,

        /// Scoring model
        #[arg(short, long, value_parser = ["ice", "rice"])]
        model: Option<String>,

        /// Exponent weights as reach,impact,confidence,effort
        #[arg(short, long)]
        weights: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value came from
    Show,

    /// Print the path of config.kdl
    Path,

    /// Set a configuration value in config.kdl
    Set {
        /// Configuration key (model, precision, output-format, weights, thresholds)
        key: String,
        /// Configuration value
        value: String,
    },
}

impl Commands {
    /// Commands that can still run when config.kdl can't be loaded, so a
    /// broken file can be located and overwritten.
    pub fn tolerates_broken_config(&self) -> bool {
        matches!(
            self,
            Commands::Config {
                command: ConfigCommands::Path | ConfigCommands::Set { .. }
            }
        )
    }
}
