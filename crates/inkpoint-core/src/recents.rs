//! Recently opened documents, most-recent-first.
//!
//! The store is loaded once at boot and written back after every mutation
//! by its owner. Persistence failures degrade to "changes are in memory
//! only" and are reported as a boolean, never propagated.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::record::{escape_field, unescape_field};

/// One recently opened document. Identity is the path; two entries are
/// equal iff their paths match.
#[derive(Debug, Clone, Eq)]
pub struct RecentEntry {
    pub path: String,
    pub title: String,
    pub author: String,
    /// Source cover bitmap path; empty when the document has no cover or
    /// thumbnail generation failed for it.
    pub cover_path: String,
}

impl PartialEq for RecentEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

#[derive(Debug, Error)]
enum RecordError {
    #[error("io: {0}")]
    Io(String),
    #[error("record header invalid")]
    BadHeader,
    #[error("record checksum mismatch")]
    BadChecksum,
}

pub struct RecentEntriesStore {
    entries: Vec<RecentEntry>,
    retained_max: usize,
    record_path: Option<std::path::PathBuf>,
}

/// Process-wide store handle; the main loop mutates it, the home screen's
/// cover pass clears failed thumbnail references through the same lock.
pub type SharedRecents = Arc<Mutex<RecentEntriesStore>>;

pub fn lock_recents(store: &SharedRecents) -> MutexGuard<'_, RecentEntriesStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl RecentEntriesStore {
    pub const DEFAULT_RETAINED_MAX: usize = 10;

    pub fn new(retained_max: usize) -> Self {
        Self {
            entries: Vec::new(),
            retained_max: retained_max.max(1),
            record_path: None,
        }
    }

    /// Load from a record file. A missing or corrupt record yields an
    /// empty store rather than an error.
    pub fn load(path: &Path, retained_max: usize) -> Self {
        let mut store = Self::new(retained_max);
        store.record_path = Some(path.to_path_buf());
        match read_record(path) {
            Ok(entries) => {
                store.entries = entries;
                store.entries.truncate(store.retained_max);
            }
            Err(RecordError::Io(_)) => {
                // First boot or unreadable card; start empty.
            }
            Err(err) => {
                log::warn!("recents record discarded: {}", err);
            }
        }
        store
    }

    /// Move the entry for `path` to the front, inserting it if new.
    pub fn add_or_promote(&mut self, path: &str, title: &str, author: &str, cover_path: &str) {
        self.entries.retain(|entry| entry.path != path);
        self.entries.insert(
            0,
            RecentEntry {
                path: path.to_string(),
                title: title.to_string(),
                author: author.to_string(),
                cover_path: cover_path.to_string(),
            },
        );
        self.entries.truncate(self.retained_max);
    }

    /// Rewrite an existing entry's fields without changing its position.
    /// Silently does nothing when the path is absent.
    pub fn update(&mut self, path: &str, title: &str, author: &str, cover_path: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.path == path) {
            entry.title = title.to_string();
            entry.author = author.to_string();
            entry.cover_path = cover_path.to_string();
        }
    }

    /// Entries most-recent-first. Callers filter out entries whose backing
    /// file no longer exists; the store does not touch the filesystem.
    pub fn entries(&self) -> &[RecentEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write back to the record this store was loaded from. Returns false
    /// when there is no record path or the write failed; the in-memory
    /// state is unaffected either way.
    pub fn persist(&self) -> bool {
        match &self.record_path {
            Some(path) => self.save(path),
            None => false,
        }
    }

    /// Write the record file. Returns false on failure; the in-memory
    /// state is unaffected either way.
    pub fn save(&self, path: &Path) -> bool {
        let mut body = String::new();
        for entry in &self.entries {
            body.push_str("e\t");
            body.push_str(&escape_field(&entry.path));
            body.push('\t');
            body.push_str(&escape_field(&entry.title));
            body.push('\t');
            body.push_str(&escape_field(&entry.author));
            body.push('\t');
            body.push_str(&escape_field(&entry.cover_path));
            body.push('\n');
        }

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(body.as_bytes());
        let out = format!("v1\t{}\n{}crc\t{:08x}\n", self.entries.len(), body, hasher.finalize());

        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::write(path, out) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("recents save failed: {}", err);
                false
            }
        }
    }
}

fn read_record(path: &Path) -> Result<Vec<RecentEntry>, RecordError> {
    let raw = std::fs::read_to_string(path).map_err(|err| RecordError::Io(err.to_string()))?;
    let mut lines = raw.lines();

    let header = lines.next().ok_or(RecordError::BadHeader)?;
    let mut header_parts = header.split('\t');
    if header_parts.next() != Some("v1") {
        return Err(RecordError::BadHeader);
    }

    let mut body = String::new();
    let mut crc_line = None;
    for line in lines {
        if let Some(rest) = line.strip_prefix("crc\t") {
            crc_line = Some(rest);
            break;
        }
        body.push_str(line);
        body.push('\n');
    }

    let stored_crc =
        u32::from_str_radix(crc_line.ok_or(RecordError::BadChecksum)?, 16).map_err(|_| RecordError::BadChecksum)?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(body.as_bytes());
    if hasher.finalize() != stored_crc {
        return Err(RecordError::BadChecksum);
    }

    let mut entries = Vec::new();
    for line in body.lines() {
        let mut parts = line.split('\t');
        if parts.next() != Some("e") {
            continue;
        }
        let (Some(path), Some(title), Some(author), Some(cover)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        entries.push(RecentEntry {
            path: unescape_field(path),
            title: unescape_field(title),
            author: unescape_field(author),
            cover_path: unescape_field(cover),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn store_with(paths: &[&str]) -> RecentEntriesStore {
        let mut store = RecentEntriesStore::new(RecentEntriesStore::DEFAULT_RETAINED_MAX);
        // Insert in reverse so the first listed path ends up most recent.
        for path in paths.iter().rev() {
            store.add_or_promote(path, &format!("title {}", path), "author", "");
        }
        store
    }

    #[test]
    fn promoting_a_middle_entry_moves_it_to_front() {
        let mut store = store_with(&["/a", "/b", "/c"]);
        store.add_or_promote("/b", "title /b", "author", "");
        let order: Vec<_> = store.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(order, vec!["/b", "/a", "/c"]);
    }

    #[test]
    fn update_preserves_order_and_ignores_unknown_paths() {
        let mut store = store_with(&["/a", "/b"]);
        store.update("/b", "new title", "new author", "/covers/b.bmp");
        store.update("/missing", "x", "y", "z");
        let order: Vec<_> = store.entries().iter().map(|e| e.path.as_str()).collect();
        assert_eq!(order, vec!["/a", "/b"]);
        assert_eq!(store.entries()[1].title, "new title");
        assert_eq!(store.entries()[1].cover_path, "/covers/b.bmp");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn retained_max_bounds_the_list() {
        let mut store = RecentEntriesStore::new(3);
        for i in 0..6 {
            store.add_or_promote(&format!("/book{}", i), "t", "a", "");
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.entries()[0].path, "/book5");
    }

    #[test]
    fn save_load_round_trips_entries() {
        let dir = TempDir::new().unwrap();
        let record = dir.path().join("recents.tsv");

        let mut store = store_with(&["/books/a.epub", "/books/b.epub"]);
        store.update("/books/b.epub", "Tab\tTitle", "Line\nAuthor", "/c\\over.bmp");
        assert!(store.save(&record));

        let loaded = RecentEntriesStore::load(&record, RecentEntriesStore::DEFAULT_RETAINED_MAX);
        assert_eq!(fields(&loaded), fields(&store));
    }

    fn fields(store: &RecentEntriesStore) -> Vec<(String, String, String, String)> {
        store
            .entries()
            .iter()
            .map(|e| {
                (
                    e.path.clone(),
                    e.title.clone(),
                    e.author.clone(),
                    e.cover_path.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn missing_record_loads_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = RecentEntriesStore::load(&dir.path().join("nope.tsv"), 5);
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_record_loads_empty() {
        let dir = TempDir::new().unwrap();
        let record = dir.path().join("recents.tsv");

        let store = store_with(&["/a", "/b"]);
        assert!(store.save(&record));
        let mut raw = std::fs::read_to_string(&record).unwrap();
        raw = raw.replace("/a", "/z");
        std::fs::write(&record, raw).unwrap();

        let loaded = RecentEntriesStore::load(&record, 5);
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_to_unwritable_path_reports_failure() {
        let store = store_with(&["/a"]);
        assert!(!store.save(Path::new("/proc/nonexistent/recents.tsv")));
        assert_eq!(store.len(), 1);
    }

    proptest! {
        #[test]
        fn most_recent_promotion_is_always_first(ops in proptest::collection::vec(0usize..8, 1..40)) {
            let mut store = RecentEntriesStore::new(RecentEntriesStore::DEFAULT_RETAINED_MAX);
            for op in &ops {
                store.add_or_promote(&format!("/book{}", op), "t", "a", "");
            }
            let last = format!("/book{}", ops[ops.len() - 1]);
            prop_assert_eq!(store.entries()[0].path.clone(), last);

            let mut paths: Vec<_> = store.entries().iter().map(|e| e.path.clone()).collect();
            paths.sort();
            paths.dedup();
            prop_assert_eq!(paths.len(), store.len());
        }

        #[test]
        fn round_trip_preserves_any_order(count in 1usize..10) {
            let dir = TempDir::new().unwrap();
            let record = dir.path().join("recents.tsv");
            let mut store = RecentEntriesStore::new(RecentEntriesStore::DEFAULT_RETAINED_MAX);
            for i in 0..count {
                store.add_or_promote(&format!("/book{}", i), &format!("t{}", i), "a", "");
            }
            prop_assert!(store.save(&record));
            let loaded = RecentEntriesStore::load(&record, RecentEntriesStore::DEFAULT_RETAINED_MAX);
            prop_assert_eq!(fields(&loaded), fields(&store));
        }
    }
}
