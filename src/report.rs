//! End-of-run summary.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::aggregator::SourceCount;
use crate::config::BackendKind;
use crate::utils::format_count_with_separator;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json", s)),
        }
    }
}

/// One generated (or, in a dry run, would-be) output file
#[derive(Debug, Clone, Serialize)]
pub struct OutputReport {
    pub backend: BackendKind,
    pub path: PathBuf,
    pub unique_lines: usize,
    #[serde(skip)]
    pub install_hint: String,
}

/// Outcome of one generation pass
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generated_at: DateTime<Local>,
    pub dry_run: bool,
    pub blacklist_domains: usize,
    pub whitelist_domains: usize,
    pub retained_domains: usize,
    pub blacklist_sources: Vec<SourceCount>,
    pub whitelist_sources: Vec<SourceCount>,
    pub outputs: Vec<OutputReport>,
    /// Names of sources that could not be fetched
    pub failures: Vec<String>,
}

impl GenerationReport {
    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self.to_string()),
            ReportFormat::Json => serde_json::to_string_pretty(self),
        }
    }
}

/// Text summary, in the wording the generated files are announced with
impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} domains blacklisted, {} whitelisted, {} retained",
            format_count_with_separator(self.blacklist_domains),
            format_count_with_separator(self.whitelist_domains),
            format_count_with_separator(self.retained_domains)
        )?;

        for output in &self.outputs {
            writeln!(f, "----------------------------------------")?;
            if self.dry_run {
                writeln!(
                    f,
                    "[dry-run] {} unique domains would be written to {}",
                    output.unique_lines,
                    output.path.display()
                )?;
                continue;
            }
            writeln!(
                f,
                "Added {} unique domains to the sinkhole file {}",
                output.unique_lines,
                output.path.display()
            )?;
            writeln!(
                f,
                "DNS sinkhole file {} generated successfully.",
                output.path.display()
            )?;
            writeln!(f, "{}", output.install_hint)?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warning: could not get data for the following lists:")?;
            writeln!(f)?;
            for name in &self.failures {
                writeln!(f, "\t{}", name)?;
            }
        }

        Ok(())
    }
}
