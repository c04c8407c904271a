//! Generate command implementation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{BackendKind, Config};
use crate::fetcher::Fetcher;
use crate::lock::LockGuard;
use crate::pipeline::{generate, GenerateOptions};
use crate::report::ReportFormat;
use crate::signal::cancellable;

/// Run the generate command
pub async fn run(
    backends: Vec<BackendKind>,
    output_dir: Option<PathBuf>,
    format: ReportFormat,
    dry_run: bool,
    config_path: &Path,
) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let options = options(&config, backends, output_dir, dry_run);

    // A dry run never touches the output directory, so it needs no lock
    let _lock = if options.dry_run {
        None
    } else {
        Some(LockGuard::acquire(&options.output_dir)?)
    };

    if config.enabled_blacklists().is_empty() {
        warn!("No blacklists enabled. Check your configuration.");
    }

    info!("Generating DNS sinkhole lists...");
    let fetcher = Fetcher::from_config(&config)?;
    let work = generate(&config, &fetcher, &options);
    let report = cancellable(work, &options.shutdown).await??;

    println!(
        "{}",
        report
            .render(format)
            .context("Failed to render generation report")?
    );

    Ok(())
}

fn options(
    config: &Config,
    backends: Vec<BackendKind>,
    output_dir: Option<PathBuf>,
    dry_run: bool,
) -> GenerateOptions {
    let mut options = GenerateOptions::from_config(config);
    if !backends.is_empty() {
        let mut backends = backends;
        backends.sort();
        backends.dedup();
        options.backends = backends;
    }
    if let Some(dir) = output_dir {
        options.output_dir = dir;
    }
    options.dry_run = dry_run;
    options
}
