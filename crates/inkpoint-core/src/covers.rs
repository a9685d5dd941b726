//! Cover thumbnail generation.
//!
//! Thumbnails are cached on the card next to nothing in particular: the
//! cache path is derived purely from the source cover path and the target
//! height, so repeated requests for the same pair always resolve to the
//! same file. Decode failures degrade one entry and are remembered by the
//! caller for the session; they never abort a batch.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

/// Cache location for a thumbnail of `cover_path` scaled to `height`.
///
/// The height is folded into the name, before the extension when there is
/// one: `/covers/a.bmp` at 240 px becomes `/covers/a.thumb240.bmp`.
pub fn thumb_cache_path(cover_path: &str, height: u32) -> String {
    let dot = cover_path
        .rfind('.')
        .filter(|dot| *dot > cover_path.rfind('/').map_or(0, |slash| slash + 1));
    match dot {
        Some(dot) => format!(
            "{}.thumb{}{}",
            &cover_path[..dot],
            height,
            &cover_path[dot..]
        ),
        None => format!("{}.thumb{}.bmp", cover_path, height),
    }
}

#[derive(Debug, Error)]
pub enum CoverError {
    #[error("cover source missing")]
    Missing,
    #[error("cover decode failed: {0}")]
    Decode(String),
    #[error("thumbnail write failed: {0}")]
    Io(String),
}

/// Produces cover thumbnails. The home screen drives this one entry at a
/// time from its render task, after the first on-screen paint.
pub trait CoverProvider: Send {
    /// Ensure a thumbnail of `height` exists for `cover_path`, returning
    /// the cache path. Must be idempotent per (path, height).
    fn ensure_thumbnail(&mut self, cover_path: &str, height: u32) -> Result<String, CoverError>;
}

/// Shared provider handle; the render-task cover pass borrows it through
/// the lock while the main loop keeps ticking.
pub type SharedCovers = Arc<Mutex<dyn CoverProvider>>;

pub fn lock_covers(covers: &SharedCovers) -> MutexGuard<'_, dyn CoverProvider + 'static> {
    match covers.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Disk-backed provider decoding BMP covers with the `image` crate.
#[derive(Default)]
pub struct BmpCoverProvider;

impl BmpCoverProvider {
    pub fn new() -> Self {
        Self
    }
}

impl CoverProvider for BmpCoverProvider {
    fn ensure_thumbnail(&mut self, cover_path: &str, height: u32) -> Result<String, CoverError> {
        let thumb = thumb_cache_path(cover_path, height);
        if Path::new(&thumb).exists() {
            return Ok(thumb);
        }
        if !Path::new(cover_path).exists() {
            return Err(CoverError::Missing);
        }

        let cover = image::open(cover_path).map_err(|err| CoverError::Decode(err.to_string()))?;
        let scaled = cover.resize(u32::MAX, height.max(1), image::imageops::FilterType::Triangle);
        scaled
            .to_rgb8()
            .save(&thumb)
            .map_err(|err| CoverError::Io(err.to_string()))?;
        Ok(thumb)
    }
}

/// Scripted provider for host tests: succeeds with the cache path unless
/// the cover path was marked as failing.
#[derive(Default)]
pub struct ScriptedCovers {
    failing: std::collections::BTreeSet<String>,
    requests: Vec<(String, u32)>,
}

impl ScriptedCovers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every request for `cover_path` fail with a decode error.
    pub fn fail_for(&mut self, cover_path: &str) {
        self.failing.insert(cover_path.to_string());
    }

    /// Every (path, height) pair requested so far, in order.
    pub fn requests(&self) -> &[(String, u32)] {
        &self.requests
    }
}

impl CoverProvider for ScriptedCovers {
    fn ensure_thumbnail(&mut self, cover_path: &str, height: u32) -> Result<String, CoverError> {
        self.requests.push((cover_path.to_string(), height));
        if self.failing.contains(cover_path) {
            Err(CoverError::Decode("scripted failure".to_string()))
        } else {
            Ok(thumb_cache_path(cover_path, height))
        }
    }
}
