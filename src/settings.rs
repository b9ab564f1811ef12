use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

pub const DEBUG_ENV: &str = "CHESS_ALARM_DEBUG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AlarmSettings {
    /// How often the scheduler checks for due alarms.
    pub tick_interval_secs: u64,
    /// Gap between alarm signals while ringing.
    pub ring_interval_secs: u64,
    /// 0-100.
    pub volume: u8,
    pub puzzle_file: PathBuf,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            tick_interval_secs: 15,
            ring_interval_secs: 3,
            volume: 70,
            puzzle_file: PathBuf::from("chess_puzzles.json"),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AlarmSettings>,
}

impl SettingsStore {
    /// Reads settings from `path`. A missing file gives defaults; a broken one
    /// gives defaults and a warning.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(
                    "Settings file {} is malformed ({err}); using defaults",
                    path.display()
                );
                AlarmSettings::default()
            })
        } else {
            AlarmSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AlarmSettings {
        self.read().clone()
    }

    /// Tick interval, shortened to one second when `CHESS_ALARM_DEBUG` is set.
    pub fn tick_interval(&self) -> Duration {
        if debug_mode() {
            return Duration::from_secs(1);
        }
        Duration::from_secs(self.read().tick_interval_secs.max(1))
    }

    pub fn ring_interval(&self) -> Duration {
        Duration::from_secs(self.read().ring_interval_secs.max(1))
    }

    pub fn update_volume(&self, volume: u8) -> Result<()> {
        let mut guard = self.write();
        guard.volume = volume.min(100);
        self.persist(&guard)
    }

    fn persist(&self, data: &AlarmSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create settings directory {}", parent.display())
                })?;
            }
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, AlarmSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AlarmSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn debug_mode() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        assert_eq!(store.get(), AlarmSettings::default());
        assert_eq!(store.ring_interval(), Duration::from_secs(3));
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2").unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.get(), AlarmSettings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"ring_interval_secs": 5}"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let settings = store.get();
        assert_eq!(settings.ring_interval_secs, 5);
        assert_eq!(settings.tick_interval_secs, 15);
    }

    #[test]
    fn volume_is_clamped_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        store.update_volume(250).unwrap();
        assert_eq!(store.get().volume, 100);

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.get().volume, 100);
    }
}
