use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

pub const SETTINGS_FILE: &str = "settings.json";

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Which persistence backend to open at start-up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Multi-user: one SQLite database.
    Sqlite,
    /// Single-user: JSON blobs next to the settings file.
    Local,
}

impl std::str::FromStr for StorageMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageMode::Sqlite),
            "local" => Ok(StorageMode::Local),
            other => anyhow::bail!("unknown storage mode '{other}' (expected sqlite or local)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerSettings {
    pub storage: StorageMode,
    pub owner: String,
    pub display_name: String,
    pub tick_interval_ms: u64,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            storage: StorageMode::Local,
            owner: "local".into(),
            display_name: "Me".into(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl TrackerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TrackerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring unreadable settings at {}: {err}", path.display());
                TrackerSettings::default()
            })
        } else {
            TrackerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> TrackerSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: TrackerSettings) -> Result<()> {
        let mut guard = self.write();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &TrackerSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, TrackerSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, TrackerSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::new(dir.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(store.get(), TrackerSettings::default());
        assert_eq!(store.get().tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn update_persists_and_partial_files_fill_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .update(TrackerSettings {
                storage: StorageMode::Sqlite,
                owner: "alice".into(),
                display_name: "Alice".into(),
                tick_interval_ms: 250,
            })
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap().get();
        assert_eq!(reloaded.storage, StorageMode::Sqlite);
        assert_eq!(reloaded.tick_interval_ms, 250);

        fs::write(&path, r#"{"owner": "bob"}"#).unwrap();
        let partial = SettingsStore::new(path).unwrap().get();
        assert_eq!(partial.owner, "bob");
        assert_eq!(partial.storage, StorageMode::Local);
        assert_eq!(partial.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        fs::write(&path, "not json").unwrap();
        assert_eq!(SettingsStore::new(path).unwrap().get(), TrackerSettings::default());
    }

    #[test]
    fn storage_mode_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<StorageMode>().unwrap(), StorageMode::Sqlite);
        assert_eq!(" local ".parse::<StorageMode>().unwrap(), StorageMode::Local);
        assert!("postgres".parse::<StorageMode>().is_err());
    }
}
