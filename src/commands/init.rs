//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// Run the init command
pub fn run(force: bool, config_path: &Path) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Config file {:?} already exists (use --force to overwrite)",
            config_path
        );
    }

    Config::default().save(config_path)?;
    info!("Wrote default configuration to {:?}", config_path);

    Ok(())
}
