//! Atomic file operations
//!
//! Log files are rewritten in full on every save. Writing through a temp
//! file and renaming it keeps the previous version intact if the process
//! dies mid-write:
//!
//! 1. Write to a temporary file (.tmp)
//! 2. Call sync_all() to flush to disk
//! 3. Rename temp file to final path (atomic on most filesystems)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

/// Result type for atomic operations
pub type AtomicResult<T> = Result<T, AtomicError>;

/// Errors that can occur during atomic operations
#[derive(Error, Debug)]
pub enum AtomicError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> AtomicError + '_ {
    move |source| AtomicError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Atomically write content to a file
///
/// ```ignore
/// atomic_write("data/committed.json", "[]")?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> AtomicResult<()> {
    atomic_write_with(path, |file| file.write_all(content.as_bytes()))
}

/// Atomically write content using a writer function
///
/// ```ignore
/// atomic_write_with("reinstall_current.sh", |file| {
///     writeln!(file, "#!/bin/bash")?;
///     Ok(())
/// })?;
/// ```
pub fn atomic_write_with<P, F>(path: P, write_fn: F) -> AtomicResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
    }

    let mut file = File::create(&temp_path).map_err(io_err(&temp_path))?;
    write_fn(&mut file).map_err(io_err(&temp_path))?;
    file.sync_all().map_err(io_err(&temp_path))?;

    fs::rename(&temp_path, path).map_err(io_err(path))?;

    Ok(())
}

/// Remove the temp file an interrupted [`atomic_write`] to `path` left behind
///
/// Only `path.with_extension("tmp")` is touched, and only if it is a regular
/// file. Returns whether a file was removed.
pub fn remove_stale_temp<P: AsRef<Path>>(path: P) -> AtomicResult<bool> {
    let temp_path = path.as_ref().with_extension("tmp");

    if !temp_path.is_file() {
        return Ok(false);
    }

    fs::remove_file(&temp_path).map_err(io_err(&temp_path))?;
    Ok(true)
}
