//! Source aggregation and whitelist subtraction.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::classifier::parse_domains;
use crate::config::{MergePolicy, SourceDescriptor};
use crate::fetcher::SourceFetcher;
use crate::utils::format_count;

/// Number of usable entries one source contributed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCount {
    pub name: String,
    pub entries: usize,
}

/// Result of aggregating one category of sources
#[derive(Debug, Default)]
pub struct Aggregate {
    /// Unique domain entries
    pub domains: HashSet<String>,
    /// Names of sources that could not be fetched, in configured order
    pub failures: Vec<String>,
    /// Per-source entry counts for successfully fetched sources
    pub sources: Vec<SourceCount>,
}

/// Fetch and classify each source in order.
///
/// Sources are fetched one at a time. A failed fetch is recorded by name and
/// never aborts the remaining sources.
pub async fn aggregate(
    fetcher: &dyn SourceFetcher,
    sources: &[&SourceDescriptor],
    merge: MergePolicy,
) -> Aggregate {
    let mut result = Aggregate::default();

    for source in sources {
        info!("Processing list: {}", source.name);

        let content = match fetcher.fetch(source).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Data retrieval failed for {}: {}", source.name, e);
                result.failures.push(source.name.clone());
                continue;
            }
        };

        let domains = parse_domains(&content);
        if domains.is_empty() {
            info!("No domain entries found in {}", source.name);
        } else {
            info!("{}: {} domain entries", source.name, format_count(domains.len()));
        }

        result.sources.push(SourceCount {
            name: source.name.clone(),
            entries: domains.len(),
        });

        match merge {
            MergePolicy::Accumulate => result.domains.extend(domains),
            MergePolicy::LastWins => result.domains = domains,
        }
    }

    result
}

/// Remove whitelisted entries from a blacklist.
///
/// Exact string comparison only: `sub.example.com` is not covered by a
/// whitelist entry `example.com`.
pub fn subtract_whitelist(
    blacklist: &HashSet<String>,
    whitelist: &HashSet<String>,
) -> HashSet<String> {
    blacklist.difference(whitelist).cloned().collect()
}
