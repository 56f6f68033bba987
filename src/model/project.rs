use serde::{Deserialize, Serialize};

use super::schedule::Schedule;
use super::task::Task;
use super::EntityKind;
use crate::error::ValidationError;

pub type ProjectId = u32;

/// A flat project that exclusively owns its tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub assignee: Option<String>,
    /// Completion percentage (0–100). Derived from `tasks`, never set directly.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Project {
    pub(crate) fn from_draft(id: ProjectId, draft: ProjectDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            schedule: draft.schedule,
            category: draft.category,
            tags: draft.tags,
            assignee: draft.assignee,
            progress: 0,
            tasks: Vec::new(),
        }
    }

    /// Overwrite the user-editable fields. Tasks and progress are kept.
    pub(crate) fn apply(&mut self, draft: ProjectDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.schedule = draft.schedule;
        self.category = draft.category;
        self.tags = draft.tags;
        self.assignee = draft.assignee;
    }

    pub fn task(&self, task_id: u32) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: u32) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Task ids are local to a project: one past the current maximum.
    pub(crate) fn next_task_id(&self) -> u32 {
        self.tasks.iter().map(|t| t.id).max().map_or(1, |max| max + 1)
    }

    /// Duration string for lists and search results.
    pub fn duration(&self) -> String {
        self.schedule.describe()
    }
}

/// User-entered fields for creating or editing a [`Project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub assignee: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>, schedule: Schedule) -> Self {
        Self {
            name: name.into(),
            schedule,
            ..Default::default()
        }
    }

    /// A project needs a name and a complete, ordered date range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName {
                entity: EntityKind::Project,
            });
        }
        self.schedule.check_required(EntityKind::Project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schedule() -> Schedule {
        Schedule::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
    }

    #[test]
    fn draft_requires_name() {
        let draft = ProjectDraft::new("   ", schedule());
        assert_eq!(
            draft.validate(),
            Err(ValidationError::MissingName {
                entity: EntityKind::Project
            })
        );
    }

    #[test]
    fn draft_requires_dates() {
        let draft = ProjectDraft::new("Launch", Schedule::default());
        assert!(matches!(
            draft.validate(),
            Err(ValidationError::MissingDateRange { .. })
        ));
        assert!(ProjectDraft::new("Launch", schedule()).validate().is_ok());
    }

    #[test]
    fn next_task_id_is_max_plus_one() {
        let mut project = Project::from_draft(1, ProjectDraft::new("Launch", schedule()));
        assert_eq!(project.next_task_id(), 1);
        project.tasks.push(Task::for_test(1, 4));
        project.tasks.push(Task::for_test(1, 2));
        assert_eq!(project.next_task_id(), 5);
    }
}
