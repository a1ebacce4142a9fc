//! CLI argument structures

use crate::storage::Format;
use crate::transform::Mode;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Flatten raw Kiva loan dumps into model-ready tables
#[derive(Parser)]
#[command(name = "kiva")]
#[command(about = "kiva - Flatten raw loan records into model-ready tables", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a TOML configuration file (defaults to ./kiva.toml when present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the commands that build tables
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Column set to produce
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Add derived model columns (expired, text lengths, theme flags)
    #[arg(long)]
    pub features: bool,

    /// Keep loans posted after this date (YYYY-MM-DD, exclusive)
    #[arg(long, value_name = "DATE")]
    pub after: Option<NaiveDate>,

    /// Keep loans posted before this date (YYYY-MM-DD, exclusive)
    #[arg(long, value_name = "DATE")]
    pub before: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a cleaned table from a directory of raw loan files
    Build {
        /// Directory of raw *.json files (defaults to input_dir from config)
        input: Option<PathBuf>,

        /// Output file (.json, .snap or .csv; defaults to output from config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format when it cannot be inferred from the extension
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Build several raw directories into one JSON dump each
    Batch {
        /// Raw directories to transform
        #[arg(required = true)]
        folders: Vec<PathBuf>,

        /// Directory the dumps are written to
        #[arg(long, default_value = "dumps")]
        out_dir: PathBuf,

        #[command(flatten)]
        build: BuildArgs,
    },

    /// Merge cleaned dumps into one deduplicated table without listing details
    Condense {
        /// Cleaned tables (.json or .snap)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "everything.json")]
        output: PathBuf,
    },

    /// Print the feature query for the model step
    Query {
        /// Select loans posted after the last 45-day listing (training set)
        #[arg(long, conflicts_with_all = ["after", "before"])]
        baseline: bool,

        /// Lower bound of the posting window (exclusive)
        #[arg(long, value_name = "DATE", requires = "before")]
        after: Option<NaiveDate>,

        /// Upper bound of the posting window (exclusive)
        #[arg(long, value_name = "DATE", requires = "after")]
        before: Option<NaiveDate>,

        /// Table to query (defaults to database.table from config)
        #[arg(long)]
        table: Option<String>,

        /// Run the query against the configured database and print rows as JSON
        #[arg(long)]
        execute: bool,
    },

    /// Load a cleaned table into the configured database
    Load {
        /// Cleaned table (.json or .snap)
        input: PathBuf,

        /// Destination table (defaults to database.table from config)
        #[arg(long)]
        table: Option<String>,
    },

    /// Train and score the majority-class baseline on a cleaned table
    Evaluate {
        /// Cleaned table built with --features
        input: PathBuf,
    },

    /// Print the effective configuration
    ShowConfig,
}
