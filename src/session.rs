//! Signed-in user context.
//!
//! The session is handed to the tracker explicitly; nothing here is global.
//! It only attributes log events, it does not gate any operation.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: u32,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub role: Role,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        match full.trim() {
            "" => self.username.clone(),
            name => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub token: Uuid,
    pub user: SessionUser,
}

impl SessionContext {
    /// A fresh session with a random token.
    pub fn new(user: SessionUser) -> Self {
        Self {
            token: Uuid::new_v4(),
            user,
        }
    }

    pub fn actor(&self) -> &str {
        &self.user.username
    }

    /// Restore the stored session.
    ///
    /// A malformed slot is cleared and treated as signed out.
    pub fn restore(store: &mut impl SessionStore) -> Option<Self> {
        let raw = store.read()?;
        match serde_json::from_str::<Self>(&raw) {
            Ok(session) => {
                debug!(user = %session.user.username, "session restored");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed stored session");
                store.clear();
                None
            }
        }
    }

    /// Serialize this session into the slot.
    pub fn persist(&self, store: &mut impl SessionStore) -> std::io::Result<()> {
        let raw = serde_json::to_string(self).map_err(std::io::Error::other)?;
        store.write(&raw)
    }
}

/// A single persisted slot holding the serialized session.
pub trait SessionStore {
    fn read(&self) -> Option<String>;
    fn write(&mut self, raw: &str) -> std::io::Result<()>;
    fn clear(&mut self);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Option<String>,
}

impl MemorySessionStore {
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Some(raw.into()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> Option<String> {
        self.slot.clone()
    }

    fn write(&mut self, raw: &str) -> std::io::Result<()> {
        self.slot = Some(raw.to_string());
        Ok(())
    }

    fn clear(&mut self) {
        self.slot = None;
    }
}

/// Slot backed by a single file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write(&mut self, raw: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, raw)
    }

    fn clear(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "session file not removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SessionUser {
        SessionUser {
            id: 1,
            username: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Ito".into(),
            role: Role::Admin,
        }
    }

    #[test]
    fn round_trips_through_memory_slot() {
        let mut store = MemorySessionStore::default();
        let session = SessionContext::new(alice());
        session.persist(&mut store).unwrap();
        assert_eq!(SessionContext::restore(&mut store), Some(session));
    }

    #[test]
    fn empty_slot_is_signed_out() {
        assert_eq!(SessionContext::restore(&mut MemorySessionStore::default()), None);
    }

    #[test]
    fn malformed_slot_is_cleared() {
        let mut store = MemorySessionStore::with_raw("{ nope");
        assert_eq!(SessionContext::restore(&mut store), None);
        assert_eq!(store.read(), None);
    }

    #[test]
    fn file_slot_is_removed_when_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "garbage").unwrap();
        let mut store = FileSessionStore::new(&path);
        assert_eq!(SessionContext::restore(&mut store), None);
        assert!(!path.exists());
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let mut user = alice();
        assert_eq!(user.display_name(), "Alice Ito");
        user.first_name.clear();
        user.last_name.clear();
        assert_eq!(user.display_name(), "alice");
        assert_eq!(Role::default().as_str(), "user");
    }
}
