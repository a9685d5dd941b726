//! Boot-resume session state.
//!
//! Remembers the document that was open so the next boot can jump straight
//! back into it. The shell clears and re-saves the record *before* it
//! re-opens the document, so a document that crashes the reader cannot
//! boot-loop the device.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::record::{escape_field, unescape_field};

pub struct SessionStateStore {
    open_book_path: Option<String>,
    path: PathBuf,
}

pub type SharedSession = Arc<Mutex<SessionStateStore>>;

pub fn lock_session(store: &SharedSession) -> MutexGuard<'_, SessionStateStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl SessionStateStore {
    pub fn load(path: PathBuf) -> Self {
        let open_book_path = read_record(&path);
        Self {
            open_book_path,
            path,
        }
    }

    pub fn open_book_path(&self) -> Option<&str> {
        self.open_book_path.as_deref()
    }

    /// Record the currently open document and persist.
    pub fn set_open_book(&mut self, book_path: &str) -> bool {
        self.open_book_path = Some(book_path.to_string());
        self.save()
    }

    /// Forget the open document and persist.
    pub fn clear_open_book(&mut self) -> bool {
        self.open_book_path = None;
        self.save()
    }

    fn save(&self) -> bool {
        let out = match &self.open_book_path {
            Some(book) => format!("v1\nopen\t{}\n", escape_field(book)),
            None => "v1\n".to_string(),
        };
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::write(&self.path, out) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("session state save failed: {}", err);
                false
            }
        }
    }
}

fn read_record(path: &std::path::Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let mut lines = raw.lines();
    if lines.next()? != "v1" {
        return None;
    }
    let line = lines.next()?;
    let book = line.strip_prefix("open\t")?;
    Some(unescape_field(book))
}
