//! Command routing and execution
//!
//! This module handles routing CLI commands to their respective implementations.

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::PipelineConfig;
use anyhow::{Context, Result};

/// Execute a CLI command against the effective configuration
pub async fn execute_command(command: Commands, config: &PipelineConfig) -> Result<()> {
    match command {
        Commands::Build {
            input,
            output,
            format,
            build,
        } => build::execute(input, output, format, &build, config),
        Commands::Batch {
            folders,
            out_dir,
            build,
        } => batch::execute(&folders, &out_dir, &build, config),
        Commands::Condense { inputs, output } => condense::execute(&inputs, &output),
        Commands::Query {
            baseline,
            after,
            before,
            table,
            execute,
        } => {
            let args = query::QueryArgs {
                baseline,
                after,
                before,
                table,
                execute,
            };
            query::execute(args, config).await
        }
        Commands::Load { input, table } => load::execute(&input, table, config).await,
        Commands::Evaluate { input } => evaluate::execute(&input, config).await,
        Commands::ShowConfig => {
            let rendered =
                toml::to_string_pretty(config).context("Failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
    }
}
