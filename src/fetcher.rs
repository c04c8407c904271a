//! Source retrieval for blocklists and whitelists.
//!
//! A source URL is either remote (`http://`, `https://`) or local (`file://`
//! or a plain filesystem path). Every retrieval is bounded by the configured
//! timeout and yields the document text or a typed [`FetchError`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::config::{Config, SourceDescriptor};

/// Maximum accepted document size (64 MB). The StevenBlack hosts file,
/// the largest default source, is a few MB.
const MAX_SOURCE_SIZE: usize = 64 * 1024 * 1024;

/// Error retrieving one source. Never fatal for the run as a whole.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unsupported URL scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("timed out after {secs}s fetching {url}")]
    Timeout { url: String, secs: u64 },

    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{url} exceeds the {limit} byte limit")]
    TooLarge { url: String, limit: usize },

    #[error("{url} is not valid UTF-8")]
    NotUtf8 { url: String },
}

/// Where a source lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    /// Parse a source URL. Strings without a scheme are local paths.
    pub fn parse(url: &str) -> Result<Self, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: "empty".to_string(),
            });
        }

        if !url.contains("://") {
            return Ok(Self::Local(PathBuf::from(url)));
        }

        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(Self::Remote(parsed)),
            "file" => parsed
                .to_file_path()
                .map(Self::Local)
                .map_err(|_| FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: "not a local file path".to_string(),
                }),
            scheme => Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }
}

/// Retrieval of source documents
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the full text of a source
    async fn fetch(&self, source: &SourceDescriptor) -> Result<String, FetchError>;
}

/// HTTP and filesystem fetcher
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    /// Create a fetcher with an explicit timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, timeout })
    }

    /// Create a fetcher from the configured timeout and user agent
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_secs), &config.user_agent)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(length) = response.content_length() {
            if length as usize > MAX_SOURCE_SIZE {
                return Err(FetchError::TooLarge {
                    url: url.to_string(),
                    limit: MAX_SOURCE_SIZE,
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.request_error(url, e))?;

        decode(url.as_str(), body.to_vec())
    }

    async fn fetch_local(&self, path: &Path) -> Result<String, FetchError> {
        let read = tokio::time::timeout(self.timeout, tokio::fs::read(path))
            .await
            .map_err(|_| FetchError::Timeout {
                url: path.display().to_string(),
                secs: self.timeout.as_secs(),
            })?;

        let bytes = read.map_err(|source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        decode(&path.display().to_string(), bytes)
    }

    fn request_error(&self, url: &Url, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                secs: self.timeout.as_secs(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source,
            }
        }
    }
}

#[async_trait]
impl SourceFetcher for Fetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<String, FetchError> {
        match SourceLocation::parse(&source.url)? {
            SourceLocation::Remote(url) => {
                debug!("GET {}", url);
                self.fetch_remote(&url).await
            }
            SourceLocation::Local(path) => {
                debug!("Reading {:?}", path);
                self.fetch_local(&path).await
            }
        }
    }
}

fn decode(url: &str, bytes: Vec<u8>) -> Result<String, FetchError> {
    if bytes.len() > MAX_SOURCE_SIZE {
        return Err(FetchError::TooLarge {
            url: url.to_string(),
            limit: MAX_SOURCE_SIZE,
        });
    }
    String::from_utf8(bytes).map_err(|_| FetchError::NotUtf8 {
        url: url.to_string(),
    })
}
