//! In-memory filesystem for host tests and scenarios.

use std::collections::{BTreeMap, BTreeSet};

use crate::filesystem::{FileInfo, FileSystem, FileSystemError};

/// In-memory filesystem keyed by absolute path.
///
/// Directories are tracked explicitly; listing scans for direct children
/// of the requested path.
#[derive(Default)]
pub struct MockFileSystem {
    files: BTreeMap<String, u64>,
    dirs: BTreeSet<String>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut fs = Self::default();
        fs.add_dir("/");
        fs
    }

    pub fn add_dir(&mut self, path: &str) {
        self.dirs.insert(path.to_string());
    }

    /// Register a file with a synthetic size.
    pub fn add_file(&mut self, path: &str, size: u64) {
        self.files.insert(path.to_string(), size);
    }

    /// Drop a file, simulating external removal from the card.
    pub fn remove_file(&mut self, path: &str) {
        self.files.remove(path);
    }

    fn direct_child(dir: &str, full: &str) -> Option<String> {
        let prefix = if dir.ends_with('/') {
            dir.to_string()
        } else {
            format!("{}/", dir)
        };
        let rest = full.strip_prefix(&prefix)?;
        if rest.is_empty() || rest.contains('/') {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

impl FileSystem for MockFileSystem {
    fn list_files(&mut self, path: &str) -> Result<Vec<FileInfo>, FileSystemError> {
        if self.files.contains_key(path) {
            return Err(FileSystemError::NotADirectory);
        }
        if !self.dirs.contains(path) {
            return Err(FileSystemError::NotFound);
        }

        let mut entries = Vec::new();
        for (file, size) in &self.files {
            if let Some(name) = Self::direct_child(path, file) {
                entries.push(FileInfo {
                    name,
                    size: *size,
                    is_directory: false,
                });
            }
        }
        for dir in &self.dirs {
            if let Some(name) = Self::direct_child(path, dir) {
                entries.push(FileInfo {
                    name,
                    size: 0,
                    is_directory: true,
                });
            }
        }
        Ok(entries)
    }

    fn exists(&mut self, path: &str) -> bool {
        self.files.contains_key(path) || self.dirs.contains(path)
    }
}
