//! Path validation
//!
//! Resolves user-supplied paths against the storage root and rejects anything
//! that would land outside of it.

use log::{debug, warn};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;
use crate::utils::validation::contains_control_chars;

/// The directory every file operation is confined to.
///
/// Holds the canonical form of the root, so containment checks compare
/// canonical paths on both sides.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
}

impl StorageRoot {
    /// Creates the root directory if needed and pins its canonical location.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        fs::create_dir_all(path)?;
        let root = path.canonicalize()?;

        if !root.is_dir() {
            return Err(StorageError::InvalidTarget(format!(
                "Storage root {} is not a directory",
                root.display()
            )));
        }

        Ok(Self { root })
    }

    /// Canonical absolute path of the root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolves `relative` to a canonical absolute path inside the root.
    ///
    /// The empty string resolves to the root itself.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if contains_control_chars(relative) {
            return Err(StorageError::InvalidPath(relative.escape_debug().to_string()));
        }

        let segments = self.normalize(relative)?;

        // Walk back to the deepest ancestor that exists on disk; everything
        // below it is created later and cannot be a link.
        let mut existing = segments.len();
        while existing > 0 {
            let candidate = self.join(&segments[..existing]);
            if fs::symlink_metadata(&candidate).is_ok() {
                break;
            }
            existing -= 1;
        }

        let anchor = self.join(&segments[..existing]);
        let canonical = anchor.canonicalize().map_err(|e| {
            // Present in the tree but not resolvable: a dangling link
            warn!("Cannot canonicalize {}: {}", anchor.display(), e);
            StorageError::PathEscape(relative.to_string())
        })?;

        if !canonical.starts_with(&self.root) {
            warn!(
                "Rejected {:?}: resolves to {} outside {}",
                relative,
                canonical.display(),
                self.root.display()
            );
            return Err(StorageError::PathEscape(relative.to_string()));
        }

        let resolved = segments[existing..]
            .iter()
            .fold(canonical, |acc, segment| acc.join(segment));

        debug!("Resolved {:?} to {}", relative, resolved.display());
        Ok(resolved)
    }

    /// Resolves a path that must name something other than the root itself.
    pub fn resolve_entry(&self, relative: &str) -> Result<PathBuf, StorageError> {
        let resolved = self.resolve(relative)?;
        if resolved == self.root {
            return Err(StorageError::InvalidTarget(
                "The storage folder itself cannot be used here".into(),
            ));
        }
        Ok(resolved)
    }

    /// Path of `absolute` relative to the root, `/`-separated.
    pub fn relative_display(&self, absolute: &Path) -> String {
        absolute
            .strip_prefix(&self.root)
            .unwrap_or(absolute)
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Splits `relative` into normal segments, folding `.` and `..` lexically.
    fn normalize(&self, relative: &str) -> Result<Vec<String>, StorageError> {
        let unified = relative.replace('\\', "/");

        // An absolute path already inside the root is accepted as-is, which
        // keeps resolution idempotent on its own output.
        let root_str = self.root.to_string_lossy().replace('\\', "/");
        let stripped = match unified.strip_prefix(root_str.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => strip_drive_prefix(&unified),
        };

        let mut segments: Vec<String> = Vec::new();
        for part in stripped.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        warn!("Rejected {:?}: climbs above the storage root", relative);
                        return Err(StorageError::PathEscape(relative.to_string()));
                    }
                }
                _ => segments.push(part.to_string()),
            }
        }

        Ok(segments)
    }

    fn join(&self, segments: &[String]) -> PathBuf {
        segments.iter().fold(self.root.clone(), |acc, s| acc.join(s))
    }
}

/// Drops a leading `C:` style drive designator.
fn strip_drive_prefix(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    }
}
