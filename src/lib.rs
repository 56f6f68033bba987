//! Project and big-project tracking core.
//!
//! Flat projects own tasks; big projects own sub-projects which own tasks.
//! Every mutation goes through [`Tracker`], which keeps progress, the Gantt
//! timeline and the selected burndown in step with the entity store.

pub mod app;
pub mod board;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod progress;
pub mod search;
pub mod session;
pub mod store;

pub use app::{ImportSummary, Tracker};
pub use config::TrackerConfig;
pub use error::{ConfigError, CsvError, SnapshotError, ValidationError};
pub use search::{EntityRef, SearchFilters, SearchResult};
pub use session::{SessionContext, SessionUser};
pub use store::{EntityStore, Snapshot};
