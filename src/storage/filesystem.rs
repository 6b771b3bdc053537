//! File system primitives
//!
//! Low-level helpers shared by the storage operations: existence checks,
//! retried removal, and write-to-temp-then-rename so a destination only ever
//! appears fully written.

use log::{error, warn};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Anything at `path`, including a link that points nowhere
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Create the parent directories of `path`
pub fn create_parent_dirs(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent),
        None => Ok(()),
    }
}

/// Runs `op`, retrying transient permission failures with a growing pause.
pub fn with_retries<T>(max_retries: usize, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    let attempts = max_retries.max(1);
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts && e.kind() == io::ErrorKind::PermissionDenied => {
                warn!(
                    "Transient permission error (attempt {}/{}): {}. Retrying...",
                    attempt, attempts, e
                );
                thread::sleep(Duration::from_millis(100 * attempt as u64));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Creates a uniquely named temporary file next to `path`.
fn temp_file_beside(path: &Path) -> io::Result<NamedTempFile> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    NamedTempFile::new_in(parent)
}

/// Writes `content` to a temporary sibling, then renames it over `path`.
///
/// The temporary file is removed automatically if anything fails.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let result = temp_file_beside(path).and_then(|mut temp_file| {
        temp_file.write_all(content)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map(|_| ()).map_err(|e| e.error)
    });

    if let Err(e) = &result {
        error!("Failed to write {}: {}", path.display(), e);
    }
    result
}

/// Copies `source` into a temporary sibling of `destination`, then moves it into place.
///
/// Fails with `AlreadyExists` rather than replacing an existing destination.
pub fn copy_atomic(source: &Path, destination: &Path) -> io::Result<u64> {
    let result = temp_file_beside(destination).and_then(|temp_file| {
        let bytes = fs::copy(source, temp_file.path())?;
        temp_file
            .persist_noclobber(destination)
            .map_err(|e| e.error)?;
        Ok(bytes)
    });

    if let Err(e) = &result {
        error!(
            "Failed to copy {} to {}: {}",
            source.display(),
            destination.display(),
            e
        );
    }
    result
}

/// Appends `content`, creating the file when `create` is set.
pub fn append(path: &Path, content: &[u8], create: bool) -> io::Result<()> {
    let mut file = OpenOptions::new().append(true).create(create).open(path)?;
    file.write_all(content)?;
    file.flush()
}

/// Reads the whole file as UTF-8 text
pub fn read_text(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
