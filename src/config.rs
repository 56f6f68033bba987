//! User-tunable defaults, read from `config.json` in the platform config dir.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::model::Priority;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Shown on Gantt rows whose task has no assignee.
    pub unassigned_label: String,
    /// Applied to projects and project tasks created without a start time.
    #[serde(with = "hhmm")]
    pub default_start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub default_end_time: NaiveTime,
    /// Given to big projects created without a priority.
    pub default_priority: Priority,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            unassigned_label: "未割当".to_string(),
            default_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            default_end_time: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or(NaiveTime::MIN),
            default_priority: Priority::Low,
        }
    }
}

impl TrackerConfig {
    /// Load from the platform config directory, falling back to defaults.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("no config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load from an explicit path. A missing or unreadable file yields the
    /// defaults; this never fails.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    pub fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// `<config dir>/config.json` for this application, if the platform has one.
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "GanttTracker")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Default location of the snapshot file used by the CLI.
pub fn default_data_path() -> PathBuf {
    match directories::ProjectDirs::from("", "", "GanttTracker") {
        Some(dirs) => dirs.data_dir().join("snapshot.json"),
        None => PathBuf::from("snapshot.json"),
    }
}

/// `"HH:MM"` on the wire; `"HH:MM:SS"` is accepted on read.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrackerConfig::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.unassigned_label, "未割当");
    }

    #[test]
    fn broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(TrackerConfig::load_from(&path), TrackerConfig::default());
    }

    #[test]
    fn try_load_reports_the_failure_kind() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            TrackerConfig::try_load_from(&missing),
            Err(ConfigError::Io(_))
        ));

        let broken = dir.path().join(CONFIG_FILE);
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            TrackerConfig::try_load_from(&broken),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn partial_file_fills_in_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{ "unassigned_label": "Unassigned", "default_start_time": "08:15" }"#,
        )
        .unwrap();
        let config = TrackerConfig::load_from(&path);
        assert_eq!(config.unassigned_label, "Unassigned");
        assert_eq!(config.default_start_time, NaiveTime::from_hms_opt(8, 15, 0).unwrap());
        assert_eq!(config.default_end_time, NaiveTime::from_hms_opt(17, 30, 0).unwrap());
        assert_eq!(config.default_priority, Priority::Low);
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = TrackerConfig {
            default_priority: Priority::High,
            ..TrackerConfig::default()
        };
        config.save_to(&path).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"17:30\""));
        assert_eq!(TrackerConfig::load_from(&path), config);
    }
}
