use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::SnapshotError;
use crate::store::Snapshot;

/// Anything that can hand the tracker its initial entities.
pub trait SnapshotSource {
    fn load(&self) -> Result<Snapshot, SnapshotError>;
}

/// A snapshot stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Save the snapshot, creating parent directories as needed.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        debug!(
            path = %self.path.display(),
            projects = snapshot.projects.len(),
            big_projects = snapshot.big_projects.len(),
            "snapshot saved"
        );
        Ok(())
    }
}

impl SnapshotSource for JsonSnapshotFile {
    fn load(&self) -> Result<Snapshot, SnapshotError> {
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// An already-built snapshot, e.g. sample data.
impl SnapshotSource for Snapshot {
    fn load(&self) -> Result<Snapshot, SnapshotError> {
        Ok(self.clone())
    }
}
