//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::BackendKind;

#[derive(Parser)]
#[command(name = "sinkhole")]
#[command(author, version, about = "DNS sinkhole list generator for pdnsd, dnscrypt-proxy and unbound")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "/etc/sinkhole/config.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/systemd timer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all lists and write the sinkhole files
    Generate {
        /// Backend to generate (repeatable, default: all configured)
        #[arg(long = "backend", value_enum)]
        backends: Vec<BackendKind>,

        /// Output directory (overrides config)
        #[arg(long, short)]
        output_dir: Option<PathBuf>,

        /// Summary format (text, json)
        #[arg(long, short, default_value = "text")]
        format: String,

        /// Fetch and render but don't write any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how list lines are classified
    Classify {
        /// Raw list lines
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// List configured blacklist and whitelist sources
    Sources,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show version
    Version,
}
