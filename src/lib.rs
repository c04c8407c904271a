//! # sinkhole - DNS sinkhole list generator
//!
//! Downloads public domain blacklists and whitelists, normalizes their
//! entries and writes one blocking file per supported resolver:
//!
//! - **pdnsd** - `pdnsd.sinkhole`, `neg`/`rr` records
//! - **dnscrypt-proxy** - `dnscrypt.cloaking.txt`, cloaking rules
//! - **unbound** - `blacklist.conf`, `local-zone` refusals
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (clap)                                                 │
//! │    └── Commands: generate, classify, sources, init          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Sources, backends, output directory, merge policy    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls, local files)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Classifier + Aggregator                                    │
//! │    └── Line rules, domain sets, whitelist subtraction       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Backends (pdnsd, dnscrypt, unbound) ─► SinkholeWriter      │
//! │    └── Dedup, staged temp file, atomic rename               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use sinkhole::config::Config;
//! use sinkhole::fetcher::Fetcher;
//! use sinkhole::pipeline::{generate, GenerateOptions};
//! use sinkhole::report::ReportFormat;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("/etc/sinkhole/config.yaml")?;
//!     let fetcher = Fetcher::from_config(&config)?;
//!
//!     let report = generate(&config, &fetcher, &GenerateOptions::from_config(&config)).await?;
//!     println!("{}", report.render(ReportFormat::Text)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Per-category domain sets and whitelist subtraction
//! - [`backend`] - Output templates per resolver
//! - [`classifier`] - Line rejection rules and normalization
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`fetcher`] - HTTP and local file retrieval of sources
//! - [`lock`] - Output directory locking
//! - [`pipeline`] - The generation pass
//! - [`report`] - Run summary (text, JSON)
//! - [`signal`] - SIGINT/SIGTERM cancellation
//! - [`writer`] - Deduplicating atomic file writer

pub mod aggregator;
pub mod backend;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod lock;
pub mod pipeline;
pub mod report;
pub mod signal;
pub mod utils;
pub mod writer;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::SinkholeError;
