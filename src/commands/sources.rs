//! Sources command implementation.

use anyhow::{Context, Result};
use std::path::Path;

use crate::config::{Config, SourceDescriptor};

/// Run the sources command
pub fn run(config_path: &Path) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    print_section("Blacklists", &config.blacklists);
    println!();
    print_section("Whitelists", &config.whitelists);

    Ok(())
}

fn print_section(title: &str, sources: &[SourceDescriptor]) {
    let enabled = sources.iter().filter(|s| s.enabled).count();
    println!("{} ({}/{} enabled):", title, enabled, sources.len());
    for source in sources {
        println!("{}", line(source));
    }
}

fn line(source: &SourceDescriptor) -> String {
    let mark = if source.enabled { "[x]" } else { "[ ]" };
    format!("  {} {:<40} {}", mark, source.name, source.url)
}
