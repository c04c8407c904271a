//! sinkhole - DNS sinkhole list generator
//!
//! Builds blocking lists for pdnsd, dnscrypt-proxy and unbound from public
//! hosts-style blacklists.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use sinkhole::cli::{Cli, Commands};
use sinkhole::error::SinkholeError;

/// Conventional exit status for a process stopped by SIGINT
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let result = match cli.command {
        Commands::Generate {
            backends,
            output_dir,
            format,
            dry_run,
        } => {
            let fmt = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            sinkhole::commands::generate::run(backends, output_dir, fmt, dry_run, &cli.config)
                .await
        }
        Commands::Classify { lines } => sinkhole::commands::classify::run(&lines),
        Commands::Sources => sinkhole::commands::sources::run(&cli.config),
        Commands::Init { force } => sinkhole::commands::init::run(force, &cli.config),
        Commands::Version => {
            println!("sinkhole {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    };

    if let Err(e) = &result {
        if matches!(e.downcast_ref::<SinkholeError>(), Some(SinkholeError::Cancelled)) {
            eprintln!("{}", e);
            std::process::exit(EXIT_CANCELLED);
        }
    }

    result
}
