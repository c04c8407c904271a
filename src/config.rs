//! Configuration management for sinkhole.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::SinkholeError;
use crate::fetcher::SourceLocation;

/// Default fetch timeout per source, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User agent sent with every remote request. Some list hosts refuse
/// obviously scripted clients, so a browser string is used.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 6.1; Win64; x64; rv:62.0) Gecko/20100101 Firefox/62.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory receiving the generated sinkhole files
    pub output_dir: PathBuf,

    /// Per-source fetch timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header for remote sources
    pub user_agent: String,

    /// Backends to generate files for
    pub backends: Vec<BackendKind>,

    /// How multiple whitelist sources are combined
    pub whitelist_merge: MergePolicy,

    /// Blocklist sources
    pub blacklists: Vec<SourceDescriptor>,

    /// Domains never to sinkhole
    pub whitelists: Vec<SourceDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("/tmp"),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            backends: BackendKind::ALL.to_vec(),
            whitelist_merge: MergePolicy::Accumulate,
            blacklists: default_blacklists(),
            whitelists: default_whitelists(),
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load the configuration file, or fall back to built-in defaults when
    /// it does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config at {:?}, using built-in defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs must be greater than zero".to_string()));
        }

        if self.user_agent.is_empty() || self.user_agent.chars().any(char::is_control) {
            return Err(invalid(
                "user_agent must be non-empty and free of control characters".to_string(),
            ));
        }

        if self.backends.is_empty() {
            return Err(invalid("at least one backend must be configured".to_string()));
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            if !seen.insert(backend) {
                return Err(invalid(format!("backend '{}' is listed twice", backend)));
            }
        }

        for (category, sources) in [("blacklist", &self.blacklists), ("whitelist", &self.whitelists)] {
            for source in sources {
                if source.name.trim().is_empty() {
                    return Err(invalid(format!(
                        "{} source with URL '{}' has no name",
                        category, source.url
                    )));
                }
                SourceLocation::parse(&source.url).map_err(|e| {
                    invalid(format!("{} '{}': {}", category, source.name, e))
                })?;
            }
        }

        Ok(())
    }

    /// Save configuration to YAML file atomically
    ///
    /// Uses tempfile + rename so a crash never leaves a truncated config.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let path = path.as_ref();
        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        let parent_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent_dir)
            .with_context(|| format!("Failed to create config directory {:?}", parent_dir))?;

        let mut temp_file = NamedTempFile::new_in(parent_dir)
            .context("Failed to create temporary file for config")?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.as_file().sync_all()?;

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to persist config file: {:?}", path))?;

        Ok(())
    }

    /// Enabled blacklist sources, in configured order
    pub fn enabled_blacklists(&self) -> Vec<&SourceDescriptor> {
        self.blacklists.iter().filter(|s| s.enabled).collect()
    }

    /// Enabled whitelist sources, in configured order
    pub fn enabled_whitelists(&self) -> Vec<&SourceDescriptor> {
        self.whitelists.iter().filter(|s| s.enabled).collect()
    }
}

fn invalid(message: String) -> anyhow::Error {
    SinkholeError::Config(message).into()
}

/// Output target
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// pdnsd `neg`/`rr` records
    Pdnsd,
    /// dnscrypt-proxy cloaking rules
    Dnscrypt,
    /// unbound `local-zone` statements
    Unbound,
}

impl BackendKind {
    pub const ALL: [BackendKind; 3] = [Self::Pdnsd, Self::Dnscrypt, Self::Unbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdnsd => "pdnsd",
            Self::Dnscrypt => "dnscrypt",
            Self::Unbound => "unbound",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combination of several sources within one category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Union of every successfully fetched source
    #[default]
    Accumulate,
    /// Only the last successfully fetched source counts
    LastWins,
}

/// A named list origin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub name: String,
    /// `https://`, `http://`, `file://` URL or a plain local path
    pub url: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            enabled: true,
        }
    }
}

fn enabled_by_default() -> bool {
    true
}

fn default_blacklists() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new("My custom blocklist", "lists/blacklist.txt"),
        SourceDescriptor::new(
            "StevenBlack blocklist",
            "https://raw.githubusercontent.com/StevenBlack/hosts/master/hosts",
        ),
        SourceDescriptor::new(
            "YouTube ads (kboghdady)",
            "https://raw.githubusercontent.com/kboghdady/youTube_ads_4_pi-hole/master/black.list",
        ),
        SourceDescriptor::new(
            "Ads and tracking extended (lightswitch05)",
            "https://raw.githubusercontent.com/lightswitch05/hosts/master/docs/lists/ads-and-tracking-extended.txt",
        ),
        SourceDescriptor {
            enabled: false,
            ..SourceDescriptor::new(
                "Facebook (lightswitch05)",
                "https://raw.githubusercontent.com/lightswitch05/hosts/master/docs/lists/facebook-extended.txt",
            )
        },
        SourceDescriptor {
            enabled: false,
            ..SourceDescriptor::new(
                "Tracking aggressive (lightswitch05)",
                "https://raw.githubusercontent.com/lightswitch05/hosts/master/docs/lists/tracking-aggressive-extended.txt",
            )
        },
    ]
}

fn default_whitelists() -> Vec<SourceDescriptor> {
    vec![SourceDescriptor::new(
        "My custom whitelist",
        "lists/whitelist.txt",
    )]
}
