//! Build command: raw directory to cleaned table

use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use tracing::info;

use crate::cli::args::BuildArgs;
use crate::config::PipelineConfig;
use crate::storage::{self, Format};
use crate::transform::{self, BuildOptions, DateWindow};

/// Merge command-line build flags over the configured options
pub fn resolve_options(args: &BuildArgs, config: &PipelineConfig) -> Result<BuildOptions> {
    let mut options = config.build.clone();
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
    if args.features {
        options.derive_features = true;
    }

    let window = DateWindow::new(
        args.after.unwrap_or(options.window.after),
        args.before.unwrap_or(options.window.before),
    );
    if window.is_empty() {
        return Err(anyhow!(
            "date window {} .. {} is empty",
            window.after,
            window.before
        ));
    }
    options.window = window;
    Ok(options)
}

pub fn execute(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: Option<Format>,
    args: &BuildArgs,
    config: &PipelineConfig,
) -> Result<()> {
    let input = input
        .or_else(|| config.input_dir.clone())
        .ok_or_else(|| anyhow!("no input directory given and none configured"))?;
    let output = output
        .or_else(|| config.output.clone())
        .ok_or_else(|| anyhow!("no output file given and none configured"))?;
    let options = resolve_options(args, config)?;

    info!("Building {} table from {}", options.mode, input.display());
    let table = transform::build_from_dir(&input, &options)
        .with_context(|| format!("Failed to build table from {}", input.display()))?;

    storage::save_table(&table, &output, format)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Built {} loans -> {}", table.len(), output.display());
    Ok(())
}
