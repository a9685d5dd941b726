//! Storage abstraction.
//!
//! The device reads books and covers from an SD card; the host runs the
//! same code against [`crate::mock_filesystem::MockFileSystem`]. Only the
//! operations the core needs are on the trait.

use std::sync::{Arc, Mutex};

/// A directory entry.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

#[derive(Debug, Clone)]
pub enum FileSystemError {
    NotFound,
    NotADirectory,
    Io(String),
}

impl core::fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FileSystemError::NotFound => write!(f, "not found"),
            FileSystemError::NotADirectory => write!(f, "not a directory"),
            FileSystemError::Io(msg) => write!(f, "io error: {}", msg),
        }
    }
}

impl std::error::Error for FileSystemError {}

/// Filesystem operations the core depends on.
pub trait FileSystem {
    /// List entries of a directory, unsorted.
    fn list_files(&mut self, path: &str) -> Result<Vec<FileInfo>, FileSystemError>;

    /// Whether a file or directory exists.
    fn exists(&mut self, path: &str) -> bool;
}

/// Process-wide filesystem handle shared between the main loop and the
/// home screen's cover pass.
pub type SharedFs = Arc<Mutex<dyn FileSystem + Send>>;

/// Lock a shared filesystem, recovering from a poisoned lock.
pub fn lock_fs(fs: &SharedFs) -> std::sync::MutexGuard<'_, dyn FileSystem + Send + 'static> {
    match fs.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Final path component.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Final path component without its extension.
pub fn file_stem(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

/// Case-insensitive extension check.
pub fn has_extension(path: &str, extension: &str) -> bool {
    let path = path.to_ascii_lowercase();
    let extension = extension.to_ascii_lowercase();
    path.ends_with(&extension)
}

/// Join a directory and an entry name with exactly one separator.
pub fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}
