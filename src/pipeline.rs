//! Generation pipeline shared by all backends.
//!
//! ```text
//! sources ─► fetch ─► classify ─► domain sets ─► whitelist filter
//!                                                      │
//!                      ┌───────────────────────────────┤
//!                      ▼               ▼               ▼
//!                   pdnsd          dnscrypt         unbound
//!                      └──► dedup writer ──► staged file ──► rename
//! ```

use anyhow::Result;
use chrono::Local;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::info;

use crate::aggregator::{aggregate, subtract_whitelist};
use crate::backend::{emitter, Emitter};
use crate::config::{BackendKind, Config, MergePolicy};
use crate::error::SinkholeError;
use crate::fetcher::SourceFetcher;
use crate::report::{GenerationReport, OutputReport};
use crate::signal::ShutdownToken;
use crate::utils::format_count;
use crate::writer::SinkholeWriter;

/// Per-run choices layered over the configuration
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub output_dir: PathBuf,
    pub backends: Vec<BackendKind>,
    /// Fetch and render, but write nothing
    pub dry_run: bool,
    /// Checked throughout the write phase
    pub shutdown: ShutdownToken,
}

impl GenerateOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            backends: config.backends.clone(),
            dry_run: false,
            shutdown: ShutdownToken::new(),
        }
    }
}

/// Fetch every source, filter, and write one file per backend.
pub async fn generate(
    config: &Config,
    fetcher: &dyn SourceFetcher,
    options: &GenerateOptions,
) -> Result<GenerationReport> {
    let started_at = Local::now();

    let whitelist = aggregate(fetcher, &config.enabled_whitelists(), config.whitelist_merge).await;
    let blacklist = aggregate(fetcher, &config.enabled_blacklists(), MergePolicy::Accumulate).await;

    let retained = subtract_whitelist(&blacklist.domains, &whitelist.domains);
    info!(
        "{} blacklisted domains, {} whitelisted, {} retained",
        format_count(blacklist.domains.len()),
        format_count(whitelist.domains.len()),
        format_count(retained.len())
    );

    // Sorted so consecutive runs produce diffable files
    let mut domains: Vec<&str> = retained.iter().map(String::as_str).collect();
    domains.sort_unstable();

    if !options.dry_run {
        std::fs::create_dir_all(&options.output_dir)
            .map_err(|e| SinkholeError::fs(&options.output_dir, e))?;
    }

    let mut outputs = Vec::with_capacity(options.backends.len());
    for kind in &options.backends {
        options.shutdown.check()?;
        let emitter = emitter(*kind);
        let unique_lines = if options.dry_run {
            count_rendered(&emitter, &domains)
        } else {
            write_backend(&emitter, &domains, options, &started_at)?
        };

        info!(
            "{}: {} unique lines",
            emitter.kind,
            format_count(unique_lines)
        );

        outputs.push(OutputReport {
            backend: emitter.kind,
            path: options.output_dir.join(emitter.file_name),
            unique_lines,
            install_hint: (emitter.install_hint)(emitter.file_name),
        });
    }

    let mut failures = whitelist.failures;
    failures.extend(blacklist.failures);

    Ok(GenerationReport {
        generated_at: started_at,
        dry_run: options.dry_run,
        blacklist_domains: blacklist.domains.len(),
        whitelist_domains: whitelist.domains.len(),
        retained_domains: retained.len(),
        whitelist_sources: whitelist.sources,
        blacklist_sources: blacklist.sources,
        outputs,
        failures,
    })
}

fn write_backend(
    emitter: &Emitter,
    domains: &[&str],
    options: &GenerateOptions,
    started_at: &chrono::DateTime<Local>,
) -> Result<usize> {
    let header = emitter.header(started_at);
    let mut writer =
        SinkholeWriter::create(&options.output_dir, emitter.file_name, header.as_deref())?;

    for line in domains.iter().filter_map(|domain| emitter.render(domain)) {
        options.shutdown.check()?;
        writer.push(&line)?;
    }

    // Dropping the writer here discards the staged file
    options.shutdown.check()?;
    Ok(writer.finish()?)
}

fn count_rendered(emitter: &Emitter, domains: &[&str]) -> usize {
    domains
        .iter()
        .filter_map(|domain| emitter.render(domain))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceDescriptor;
    use crate::fetcher::{FetchError, MockSourceFetcher};
    use std::fs;
    use tempfile::TempDir;

    fn fetcher() -> MockSourceFetcher {
        let mut fetcher = MockSourceFetcher::new();
        fetcher.expect_fetch().returning(|source| match source.name.as_str() {
            "hosts" => Ok("0.0.0.0 bad.com\n0.0.0.0 good.com\n0.0.0.0 *.ads.example.com\n".to_string()),
            "patterns" => Ok(".tracker.com\nbad.com\n".to_string()),
            "white" => Ok("good.com\n".to_string()),
            _ => Err(FetchError::HttpStatus {
                url: source.url.clone(),
                status: 500,
            }),
        });
        fetcher
    }

    fn config(dir: &TempDir) -> Config {
        Config {
            output_dir: dir.path().to_path_buf(),
            blacklists: vec![
                SourceDescriptor::new("hosts", "https://example.com/hosts"),
                SourceDescriptor::new("down", "https://example.com/down"),
                SourceDescriptor::new("patterns", "https://example.com/patterns"),
            ],
            whitelists: vec![SourceDescriptor::new("white", "https://example.com/white")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_generate_all_backends() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let options = GenerateOptions::from_config(&config);

        let report = generate(&config, &fetcher(), &options).await.unwrap();

        assert_eq!(report.blacklist_domains, 4);
        assert_eq!(report.whitelist_domains, 1);
        assert_eq!(report.retained_domains, 3);
        assert_eq!(report.failures, vec!["down".to_string()]);

        let pdnsd = fs::read_to_string(dir.path().join("pdnsd.sinkhole")).unwrap();
        assert!(pdnsd.starts_with("// Auto-generated list, build date "));
        let body: Vec<&str> = pdnsd.lines().skip(3).collect();
        assert_eq!(
            body,
            vec![
                "neg { name=*.ads.example.com; types = domain; }",
                "neg { name=*.tracker.com; types = domain; }",
                "rr { name=bad.com; a=0.0.0.0; }",
            ]
        );
        assert!(!pdnsd.contains("good.com"));

        let dnscrypt = fs::read_to_string(dir.path().join("dnscrypt.cloaking.txt")).unwrap();
        assert!(dnscrypt.starts_with("# Auto-generated list"));
        assert!(dnscrypt.ends_with("\n\nbad.com 0.0.0.0\n"));

        let unbound = fs::read_to_string(dir.path().join("blacklist.conf")).unwrap();
        assert_eq!(unbound, "local-zone: \"bad.com\" always_refuse\n");

        let counts: Vec<usize> = report.outputs.iter().map(|o| o.unique_lines).collect();
        assert_eq!(counts, vec![3, 1, 1]);
    }

    #[tokio::test]
    async fn test_generate_selected_backend_only() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let options = GenerateOptions {
            backends: vec![BackendKind::Unbound],
            ..GenerateOptions::from_config(&config)
        };

        let report = generate(&config, &fetcher(), &options).await.unwrap();

        assert_eq!(report.outputs.len(), 1);
        assert!(dir.path().join("blacklist.conf").exists());
        assert!(!dir.path().join("pdnsd.sinkhole").exists());
    }

    #[tokio::test]
    async fn test_generate_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let options = GenerateOptions {
            dry_run: true,
            output_dir: dir.path().join("never-created"),
            ..GenerateOptions::from_config(&config)
        };

        let report = generate(&config, &fetcher(), &options).await.unwrap();

        assert!(report.dry_run);
        let counts: Vec<usize> = report.outputs.iter().map(|o| o.unique_lines).collect();
        assert_eq!(counts, vec![3, 1, 1]);
        assert!(!dir.path().join("never-created").exists());
    }

    #[tokio::test]
    async fn test_generate_cancelled_finalizes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blacklist.conf"), "previous\n").unwrap();
        let config = config(&dir);
        let options = GenerateOptions::from_config(&config);
        options.shutdown.cancel();

        let err = generate(&config, &fetcher(), &options).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SinkholeError>(),
            Some(SinkholeError::Cancelled)
        ));
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("blacklist.conf")]);
        assert_eq!(
            fs::read_to_string(dir.path().join("blacklist.conf")).unwrap(),
            "previous\n"
        );
    }

    #[test]
    fn test_write_backend_cancelled_discards_staging() {
        let dir = TempDir::new().unwrap();
        let options = GenerateOptions {
            output_dir: dir.path().to_path_buf(),
            backends: vec![BackendKind::Unbound],
            dry_run: false,
            shutdown: ShutdownToken::new(),
        };
        options.shutdown.cancel();

        let result = write_backend(
            &emitter(BackendKind::Unbound),
            &["a.example.com", "b.example.com"],
            &options,
            &Local::now(),
        );

        assert!(result.is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_cancel_between_backends_keeps_finished_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blacklist.conf"), "previous\n").unwrap();
        let options = GenerateOptions {
            output_dir: dir.path().to_path_buf(),
            backends: vec![BackendKind::Pdnsd, BackendKind::Unbound],
            dry_run: false,
            shutdown: ShutdownToken::new(),
        };
        let domains = ["bad.com"];
        let started_at = Local::now();

        write_backend(&emitter(BackendKind::Pdnsd), &domains, &options, &started_at).unwrap();
        options.shutdown.cancel();
        let unbound = write_backend(
            &emitter(BackendKind::Unbound),
            &domains,
            &options,
            &started_at,
        );

        assert!(unbound.is_err());
        let pdnsd = fs::read_to_string(dir.path().join("pdnsd.sinkhole")).unwrap();
        assert!(pdnsd.ends_with("rr { name=bad.com; a=0.0.0.0; }\n"));
        assert_eq!(
            fs::read_to_string(dir.path().join("blacklist.conf")).unwrap(),
            "previous\n"
        );
    }

    #[tokio::test]
    async fn test_generate_all_sources_failed() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            output_dir: dir.path().to_path_buf(),
            blacklists: vec![SourceDescriptor::new("down", "https://example.com/down")],
            whitelists: vec![],
            ..Default::default()
        };
        let options = GenerateOptions::from_config(&config);

        let report = generate(&config, &fetcher(), &options).await.unwrap();

        assert_eq!(report.failures, vec!["down".to_string()]);
        assert!(report.outputs.iter().all(|o| o.unique_lines == 0));
        // Header-only files are still produced
        let pdnsd = fs::read_to_string(dir.path().join("pdnsd.sinkhole")).unwrap();
        assert_eq!(pdnsd.lines().count(), 3);
    }
}
