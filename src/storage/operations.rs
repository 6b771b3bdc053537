//! Storage operations
//!
//! Handles the file management primitives exposed to the command layer:
//! read, write, append, edit, delete, copy, move, list, search and directory
//! creation. Every path argument goes through [`StorageRoot::resolve`] first.

use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::storage::filesystem::{
    self, create_parent_dirs, directory_exists, entry_exists, file_exists, with_retries,
};
use crate::storage::results::{
    CreateDirectoryResult, EditResult, FileInfo, TransferResult, WriteResult,
};
use crate::storage::validation::StorageRoot;

/// Default attempts for operations that retry on transient permission errors
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// The sandboxed file operations engine
#[derive(Debug, Clone)]
pub struct FileOperations {
    root: StorageRoot,
    max_retries: usize,
}

impl FileOperations {
    pub fn new(root: StorageRoot) -> Self {
        Self {
            root,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Reads a file as text
    pub fn read(&self, filename: &str) -> Result<String, StorageError> {
        let path = self.root.resolve_entry(filename)?;
        self.require_file(&path, filename)?;

        let content =
            filesystem::read_text(&path).map_err(|e| StorageError::from_io(e, filename))?;
        info!("Read file: {} ({} bytes)", filename, content.len());
        Ok(content)
    }

    /// Writes `content` to a file, creating missing parent directories.
    ///
    /// An existing file is only replaced when `overwrite` is set.
    pub fn write(
        &self,
        filename: &str,
        content: &str,
        overwrite: bool,
    ) -> Result<WriteResult, StorageError> {
        let path = self.root.resolve_entry(filename)?;

        if directory_exists(&path) {
            return Err(is_a_directory(filename));
        }
        let existed = entry_exists(&path);
        if existed && !overwrite {
            warn!("File exists and overwrite is false: {}", filename);
            return Err(StorageError::Conflict(filename.to_string()));
        }

        create_parent_dirs(&path).map_err(|e| StorageError::from_io(e, filename))?;
        filesystem::write_atomic(&path, content.as_bytes())
            .map_err(|e| StorageError::from_io(e, filename))?;

        info!("Wrote {} bytes to file: {}", content.len(), filename);
        Ok(WriteResult {
            path: self.root.relative_display(&path),
            bytes_written: content.len(),
            created: !existed,
        })
    }

    /// Appends `content` to a file, creating it when missing and `create_if_missing` is set.
    pub fn append(
        &self,
        filename: &str,
        content: &str,
        create_if_missing: bool,
    ) -> Result<WriteResult, StorageError> {
        let path = self.root.resolve_entry(filename)?;

        if directory_exists(&path) {
            return Err(is_a_directory(filename));
        }
        let existed = file_exists(&path);
        if !existed {
            if !create_if_missing {
                warn!("File does not exist and create_if_missing is false: {}", filename);
                return Err(StorageError::NotFound(filename.to_string()));
            }
            create_parent_dirs(&path).map_err(|e| StorageError::from_io(e, filename))?;
        }

        filesystem::append(&path, content.as_bytes(), create_if_missing)
            .map_err(|e| StorageError::from_io(e, filename))?;

        info!("Appended {} bytes to file: {}", content.len(), filename);
        Ok(WriteResult {
            path: self.root.relative_display(&path),
            bytes_written: content.len(),
            created: !existed,
        })
    }

    /// Replaces every literal occurrence of `find_text` with `replace_text`.
    ///
    /// The file is rewritten only if something matched. An empty `find_text`
    /// matches nothing.
    pub fn edit(
        &self,
        filename: &str,
        find_text: &str,
        replace_text: &str,
    ) -> Result<EditResult, StorageError> {
        let content = self.read(filename)?;
        let path = self.root.resolve_entry(filename)?;

        let replacements = if find_text.is_empty() {
            0
        } else {
            content.matches(find_text).count()
        };

        if replacements == 0 {
            info!("No changes made to file: {}", filename);
        } else {
            let updated = content.replace(find_text, replace_text);
            filesystem::write_atomic(&path, updated.as_bytes())
                .map_err(|e| StorageError::from_io(e, filename))?;
            info!("Replaced {} occurrence(s) in file: {}", replacements, filename);
        }

        Ok(EditResult {
            path: self.root.relative_display(&path),
            replacements,
        })
    }

    /// Deletes a file
    pub fn delete(&self, filename: &str) -> Result<(), StorageError> {
        let path = self.root.resolve_entry(filename)?;
        self.require_file(&path, filename)?;

        with_retries(self.max_retries, || fs::remove_file(&path)).map_err(|e| {
            error!("Failed to delete file {} ({}): {}", filename, path.display(), e);
            StorageError::from_io(e, filename)
        })?;

        info!("Deleted file: {}", filename);
        Ok(())
    }

    /// Copies a file, creating the destination's parent directories.
    ///
    /// Never overwrites an existing destination.
    pub fn copy(&self, source: &str, destination: &str) -> Result<TransferResult, StorageError> {
        let (source_path, dest_path) = self.prepare_transfer(source, destination)?;

        filesystem::copy_atomic(&source_path, &dest_path)
            .map_err(|e| StorageError::from_io(e, destination))?;

        info!("Copied file from {} to {}", source, destination);
        Ok(self.transfer_result(&source_path, &dest_path))
    }

    /// Moves a file. Falls back to copy-then-delete when a rename is not possible.
    ///
    /// The source is only removed once the destination is fully written.
    pub fn move_file(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<TransferResult, StorageError> {
        let (source_path, dest_path) = self.prepare_transfer(source, destination)?;

        if let Err(e) = fs::rename(&source_path, &dest_path) {
            debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                source, destination, e
            );
            self.move_by_copy(&source_path, &dest_path, source, destination)?;
        }

        info!("Moved file from {} to {}", source, destination);
        Ok(self.transfer_result(&source_path, &dest_path))
    }

    /// Copies then removes the source. The source stays put unless the copy completed.
    fn move_by_copy(
        &self,
        source_path: &Path,
        dest_path: &Path,
        source: &str,
        destination: &str,
    ) -> Result<(), StorageError> {
        filesystem::copy_atomic(source_path, dest_path)
            .map_err(|e| StorageError::from_io(e, destination))?;

        with_retries(self.max_retries, || fs::remove_file(source_path)).map_err(|e| {
            error!("Copied {} to {} but failed to remove source: {}", source, destination, e);
            StorageError::SourceRetained {
                source: source.to_string(),
                destination: destination.to_string(),
                error: e,
            }
        })
    }

    /// Lists the entries directly inside a directory, sorted by name.
    ///
    /// Directory names carry a trailing `/`.
    pub fn list(&self, subdirectory: &str) -> Result<Vec<String>, StorageError> {
        let dir_path = self.root.resolve(subdirectory)?;
        let label = display_name(subdirectory);
        self.require_directory(&dir_path, label)?;

        let entries = with_retries(self.max_retries, || fs::read_dir(&dir_path))
            .map_err(|e| StorageError::from_io(e, label))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                match entry.file_type() {
                    Ok(kind) if kind.is_dir() => format!("{}/", name),
                    _ => name,
                }
            })
            .collect();
        names.sort();

        info!("Listed directory {} - {} entries", label, names.len());
        Ok(names)
    }

    /// Recursively finds files under `subdirectory` whose text contains `search_text`.
    ///
    /// Files that cannot be read as text are skipped. Links are not followed.
    pub fn search(
        &self,
        search_text: &str,
        subdirectory: &str,
    ) -> Result<Vec<String>, StorageError> {
        let dir_path = self.root.resolve(subdirectory)?;
        let label = display_name(subdirectory);
        self.require_directory(&dir_path, label)?;

        let mut matches = Vec::new();
        for entry in WalkDir::new(&dir_path)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Skipping unreadable entry during search: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            match filesystem::read_text(entry.path()) {
                Ok(content) if content.contains(search_text) => {
                    matches.push(self.root.relative_display(entry.path()));
                }
                Ok(_) => {}
                Err(e) => debug!("Skipping {}: {}", entry.path().display(), e),
            }
        }

        info!(
            "Found {} files containing '{}' under {}",
            matches.len(),
            search_text,
            label
        );
        Ok(matches)
    }

    /// Creates a directory and any missing parents.
    pub fn create_directory(
        &self,
        directory: &str,
    ) -> Result<CreateDirectoryResult, StorageError> {
        let path = self.root.resolve_entry(directory)?;

        if directory_exists(&path) {
            debug!("Directory already exists: {}", directory);
            return Ok(CreateDirectoryResult {
                path: self.root.relative_display(&path),
                created: false,
            });
        }
        if entry_exists(&path) {
            return Err(StorageError::Conflict(directory.to_string()));
        }

        fs::create_dir_all(&path).map_err(|e| match e.kind() {
            // A file sits somewhere along the way
            std::io::ErrorKind::AlreadyExists | std::io::ErrorKind::NotADirectory => {
                StorageError::Conflict(directory.to_string())
            }
            _ => StorageError::from_io(e, directory),
        })?;

        info!("Created directory: {}", directory);
        Ok(CreateDirectoryResult {
            path: self.root.relative_display(&path),
            created: true,
        })
    }

    /// Reports size, modification time and kind of an entry
    pub fn file_info(&self, filename: &str) -> Result<FileInfo, StorageError> {
        let path = self.root.resolve_entry(filename)?;
        let metadata = fs::metadata(&path).map_err(|e| StorageError::from_io(e, filename))?;

        let modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|dur| dur.as_secs())
            .unwrap_or(0);

        Ok(FileInfo {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: self.root.relative_display(&path),
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified,
            is_directory: metadata.is_dir(),
        })
    }

    fn prepare_transfer(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<(PathBuf, PathBuf), StorageError> {
        let source_path = self.root.resolve_entry(source)?;
        let dest_path = self.root.resolve_entry(destination)?;

        self.require_file(&source_path, source)?;
        if entry_exists(&dest_path) {
            warn!("Destination already exists: {}", destination);
            return Err(StorageError::Conflict(destination.to_string()));
        }

        create_parent_dirs(&dest_path).map_err(|e| StorageError::from_io(e, destination))?;
        Ok((source_path, dest_path))
    }

    fn transfer_result(&self, source: &Path, destination: &Path) -> TransferResult {
        TransferResult {
            source: self.root.relative_display(source),
            destination: self.root.relative_display(destination),
        }
    }

    fn require_file(&self, path: &Path, label: &str) -> Result<(), StorageError> {
        if directory_exists(path) {
            return Err(is_a_directory(label));
        }
        if !file_exists(path) {
            warn!("File does not exist: {}", label);
            return Err(StorageError::NotFound(label.to_string()));
        }
        Ok(())
    }

    fn require_directory(&self, path: &Path, label: &str) -> Result<(), StorageError> {
        if file_exists(path) {
            return Err(StorageError::InvalidTarget(format!(
                "{} is a file, not a folder",
                label
            )));
        }
        if !directory_exists(path) {
            warn!("Directory does not exist: {}", label);
            return Err(StorageError::NotFound(label.to_string()));
        }
        Ok(())
    }
}

fn is_a_directory(label: &str) -> StorageError {
    StorageError::InvalidTarget(format!("{} is a folder, not a file", label))
}

fn display_name(subdirectory: &str) -> &str {
    if subdirectory.is_empty() {
        "the storage folder"
    } else {
        subdirectory
    }
}
