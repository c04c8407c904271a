//! Deduplicating output writer.
//!
//! Rendered lines are appended to an intermediate file, then copied to the
//! output in their original order with exact duplicate lines dropped. The
//! deduplication is on line text, not on domains.
//!
//! [`SinkholeWriter`] stages a whole output file next to its destination and
//! renames it into place once complete, so an interrupted run never leaves a
//! half-written file or a stale intermediate behind.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::SinkholeError;

/// Mode of generated files: daemons usually read them as their own user
const OUTPUT_MODE: u32 = 0o644;

/// Copy every first-seen line of `reader` to `writer`, returning the number
/// of unique lines written.
pub fn dedup_lines<R: BufRead, W: Write>(reader: R, writer: &mut W) -> io::Result<usize> {
    let mut seen = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        if seen.contains(&line) {
            continue;
        }
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        seen.insert(line);
    }
    Ok(seen.len())
}

/// Append the unique lines of `intermediate` to `final_path`, then delete
/// `intermediate`.
///
/// This is the standalone append-mode form of the writer. The final file is
/// opened in append mode: any header must already be in place, and repeated
/// commits accumulate. Generation uses [`SinkholeWriter`] instead, which
/// stages the whole file and renames it into place.
pub fn commit(intermediate: &Path, final_path: &Path) -> Result<usize, SinkholeError> {
    let input = File::open(intermediate).map_err(|e| SinkholeError::fs(intermediate, e))?;
    let output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(final_path)
        .map_err(|e| SinkholeError::fs(final_path, e))?;

    let mut output = BufWriter::new(output);
    let count = dedup_lines(BufReader::new(input), &mut output)
        .and_then(|count| output.flush().map(|_| count))
        .map_err(|e| SinkholeError::fs(final_path, e))?;

    fs::remove_file(intermediate).map_err(|e| SinkholeError::fs(intermediate, e))?;

    Ok(count)
}

/// Staged writer for one output file.
///
/// Both the staged output and the intermediate line file are process-unique
/// temporary files in the destination directory. Dropping the writer without
/// calling [`SinkholeWriter::finish`] removes both and leaves any previous
/// output untouched.
pub struct SinkholeWriter {
    final_path: PathBuf,
    staged: NamedTempFile,
    rendered: BufWriter<NamedTempFile>,
}

impl SinkholeWriter {
    /// Start a new output `dir/file_name`, beginning with `header`.
    pub fn create(dir: &Path, file_name: &str, header: Option<&str>) -> Result<Self, SinkholeError> {
        let final_path = dir.join(file_name);
        let prefix = format!(".{}.", file_name);

        let mut staged = Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| SinkholeError::fs(dir, e))?;

        if let Some(header) = header {
            staged
                .write_all(header.as_bytes())
                .map_err(|e| SinkholeError::fs(staged.path(), e))?;
        }

        let rendered = Builder::new()
            .prefix(&prefix)
            .suffix(".lines.tmp")
            .tempfile_in(dir)
            .map_err(|e| SinkholeError::fs(dir, e))?;

        debug!(
            "Staging {:?} via {:?} and {:?}",
            final_path,
            staged.path(),
            rendered.path()
        );

        Ok(Self {
            final_path,
            staged,
            rendered: BufWriter::new(rendered),
        })
    }

    /// Destination of the finished file
    pub fn path(&self) -> &Path {
        &self.final_path
    }

    /// Append one rendered line to the intermediate file
    pub fn push(&mut self, line: &str) -> Result<(), SinkholeError> {
        self.rendered
            .write_all(line.as_bytes())
            .and_then(|_| self.rendered.write_all(b"\n"))
            .map_err(|e| SinkholeError::fs(self.rendered.get_ref().path(), e))
    }

    /// Deduplicate the pushed lines into the staged file and rename it onto
    /// the destination. Returns the number of unique lines written.
    pub fn finish(self) -> Result<usize, SinkholeError> {
        let Self {
            final_path,
            mut staged,
            rendered,
        } = self;

        let rendered = rendered
            .into_inner()
            .map_err(|e| SinkholeError::fs(&final_path, e.into_error()))?;
        let lines = rendered
            .reopen()
            .map_err(|e| SinkholeError::fs(rendered.path(), e))?;

        let staged_path = staged.path().to_path_buf();
        let count = {
            let mut output = BufWriter::new(&mut staged);
            dedup_lines(BufReader::new(lines), &mut output)
                .and_then(|count| output.flush().map(|_| count))
                .map_err(|e| SinkholeError::fs(&staged_path, e))?
        };

        staged
            .as_file()
            .sync_all()
            .map_err(|e| SinkholeError::fs(&staged_path, e))?;
        fs::set_permissions(&staged_path, fs::Permissions::from_mode(OUTPUT_MODE))
            .map_err(|e| SinkholeError::fs(&staged_path, e))?;

        staged
            .persist(&final_path)
            .map_err(|e| SinkholeError::fs(&final_path, e.error))?;

        // `rendered` is removed when dropped here
        Ok(count)
    }
}
