use serde::{Deserialize, Serialize};

use super::project::ProjectId;
use super::schedule::Schedule;
use super::{EntityKind, TaskStatus};
use crate::error::ValidationError;

pub type TaskId = u32;

/// A task inside a flat [`Project`](super::Project).
///
/// `id` is only unique within the owning project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub schedule: Schedule,
    pub assignee: Option<String>,
    pub category: Option<String>,
}

impl Task {
    /// New tasks always start as not-started.
    pub(crate) fn from_draft(id: TaskId, project_id: ProjectId, draft: TaskDraft) -> Self {
        Self {
            id,
            project_id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::NotStarted,
            schedule: draft.schedule,
            assignee: draft.assignee,
            category: draft.category,
        }
    }

    pub(crate) fn apply(&mut self, draft: TaskDraft, status: TaskStatus) {
        self.title = draft.title;
        self.description = draft.description;
        self.schedule = draft.schedule;
        self.assignee = draft.assignee;
        self.category = draft.category;
        self.status = status;
    }

    pub fn duration(&self) -> String {
        self.schedule.describe()
    }

    #[cfg(test)]
    pub(crate) fn for_test(project_id: ProjectId, id: TaskId) -> Self {
        Self::from_draft(id, project_id, TaskDraft::new(format!("task {id}")))
    }
}

/// User-entered fields for creating or editing a task in either hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Schedule,
    pub assignee: Option<String>,
    pub category: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// A title is required; dates are optional but must be ordered when both are set.
    pub fn validate(&self, entity: EntityKind) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingName { entity });
        }
        self.schedule.check_order(entity)
    }
}
