//! Device settings with on-card persistence.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::record::{escape_field, unescape_field};

/// User-tunable device settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    /// External library catalog URL; empty disables the OPDS menu entry.
    pub opds_url: String,
    /// How long the power button must be held to sleep (and to wake).
    pub power_button_hold_ms: u64,
    /// Inactivity window before automatic deep sleep.
    pub auto_sleep_timeout_ms: u64,
    /// Recent-document tiles shown on the home screen.
    pub recent_max: usize,
    /// Cover thumbnail height in pixels.
    pub cover_height: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            opds_url: String::new(),
            power_button_hold_ms: 2000,
            auto_sleep_timeout_ms: 10 * 60 * 1000,
            recent_max: 3,
            cover_height: 240,
        }
    }
}

/// Settings plus the record path they persist to.
pub struct SettingsStore {
    settings: DeviceSettings,
    path: PathBuf,
}

pub type SharedSettings = Arc<Mutex<SettingsStore>>;

pub fn lock_settings(store: &SharedSettings) -> MutexGuard<'_, SettingsStore> {
    match store.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl SettingsStore {
    /// Load settings, falling back to defaults for a missing or corrupt
    /// record.
    pub fn load(path: PathBuf) -> Self {
        let settings = read_record(&path).unwrap_or_else(|| {
            log::info!("settings record missing or invalid, using defaults");
            DeviceSettings::default()
        });
        Self { settings, path }
    }

    pub fn get(&self) -> &DeviceSettings {
        &self.settings
    }

    /// Apply new values and write them back. Returns false when the write
    /// failed (new values stay active in memory).
    pub fn set(&mut self, settings: DeviceSettings) -> bool {
        self.settings = settings;
        self.save()
    }

    pub fn save(&self) -> bool {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}",
            escape_field(&self.settings.opds_url),
            self.settings.power_button_hold_ms,
            self.settings.auto_sleep_timeout_ms,
            self.settings.recent_max,
            self.settings.cover_height,
        );
        let out = format!("v1\n{}\n", line);
        if let Some(parent) = self.path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match std::fs::write(&self.path, out) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("settings save failed: {}", err);
                false
            }
        }
    }
}

fn read_record(path: &std::path::Path) -> Option<DeviceSettings> {
    let raw = std::fs::read_to_string(path).ok()?;
    let mut lines = raw.lines();
    if lines.next()? != "v1" {
        return None;
    }
    let mut fields = lines.next()?.split('\t');
    Some(DeviceSettings {
        opds_url: unescape_field(fields.next()?),
        power_button_hold_ms: fields.next()?.parse().ok()?,
        auto_sleep_timeout_ms: fields.next()?.parse().ok()?,
        recent_max: fields.next()?.parse().ok()?,
        cover_height: fields.next()?.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_record_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::load(dir.path().join("settings.tsv"));
        assert_eq!(store.get(), &DeviceSettings::default());
    }

    #[test]
    fn settings_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.tsv");

        let mut store = SettingsStore::load(path.clone());
        let custom = DeviceSettings {
            opds_url: "http://catalog.example/opds".to_string(),
            power_button_hold_ms: 1500,
            auto_sleep_timeout_ms: 5 * 60 * 1000,
            recent_max: 5,
            cover_height: 180,
        };
        assert!(store.set(custom.clone()));

        let reloaded = SettingsStore::load(path);
        assert_eq!(reloaded.get(), &custom);
    }

    #[test]
    fn truncated_record_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.tsv");
        std::fs::write(&path, "v1\nhttp://x\t1500\n").unwrap();
        let store = SettingsStore::load(path);
        assert_eq!(store.get(), &DeviceSettings::default());
    }
}
