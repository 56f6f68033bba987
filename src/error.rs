use chrono::NaiveDate;
use thiserror::Error;

use crate::model::EntityKind;

/// A user-correctable rejection of a create or edit.
///
/// The mutation that produced it has been aborted before touching any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} name is required", .entity.label())]
    MissingName { entity: EntityKind },

    #[error("{} requires both a start date and an end date", .entity.label())]
    MissingDateRange { entity: EntityKind },

    #[error("{} end date {end} is before its start date {start}", .entity.label())]
    EndBeforeStart {
        entity: EntityKind,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl ValidationError {
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::MissingName { entity }
            | Self::MissingDateRange { entity }
            | Self::EndBeforeStart { entity, .. } => *entity,
        }
    }
}

/// Failure reading or writing a persisted snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reading or writing `config.json`. Loading swallows it and falls
/// back to defaults; only [`crate::TrackerConfig::try_load_from`] and
/// [`crate::TrackerConfig::save_to`] return it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure importing or exporting task CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns (task name, start date, end date); found {found:?}")]
    MissingColumns { found: Vec<String> },

    #[error("no valid tasks found in CSV ({skipped} rows skipped)")]
    Empty { skipped: usize },
}
