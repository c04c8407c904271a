//! Output directory locking.
//!
//! Two generation passes writing the same directory would race on the
//! final rename, so each pass holds an advisory exclusive lock on a file in
//! the output directory for its whole duration.
//!
//! The lock file `.sinkhole.lock` is left in the output directory after the
//! run; only the lock on it is released. Unlinking it while held would let a
//! later instance lock a new file at the same path alongside a current one.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::SinkholeError;

const LOCK_FILE: &str = ".sinkhole.lock";

/// Holds the output directory lock until dropped.
pub struct LockGuard {
    _file: File,
    path: PathBuf,
}

impl LockGuard {
    /// Take the lock for `dir`, failing immediately if another instance
    /// holds it. The directory is created if needed.
    pub fn acquire(dir: &Path) -> Result<Self, SinkholeError> {
        std::fs::create_dir_all(dir).map_err(|e| SinkholeError::fs(dir, e))?;

        let path = dir.join(LOCK_FILE);
        // No truncate: the file may be held by another instance
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| SinkholeError::fs(&path, e))?;

        file.try_lock_exclusive()
            .map_err(|_| SinkholeError::Locked(dir.to_path_buf()))?;

        Ok(Self { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// The lock is released when the file is closed on drop; the file stays
