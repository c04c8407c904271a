//! Error types for sinkhole.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkholeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error on {path:?}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Another generation pass holds the lock on {0:?}")]
    Locked(PathBuf),

    #[error("Generation cancelled")]
    Cancelled,
}

impl SinkholeError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}
