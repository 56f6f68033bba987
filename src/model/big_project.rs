//! Two-level hierarchy: big project → sub-project → sub-project task.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::schedule::{check_date_order, describe_date_span, Schedule};
use super::task::TaskDraft;
use super::{BigProjectStatus, EntityKind, Priority, TaskStatus};
use crate::error::ValidationError;

pub type BigProjectId = u32;
pub type SubProjectId = u32;
pub type SubProjectTaskId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigProject {
    pub id: BigProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub status: BigProjectStatus,
    /// Completion percentage over every task of every sub-project, flattened.
    #[serde(default)]
    pub progress: u8,
    pub manager: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub sub_projects: Vec<SubProject>,
}

impl BigProject {
    pub(crate) fn from_draft(id: BigProjectId, draft: BigProjectDraft, priority: Priority) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            start_date: draft.start_date,
            end_date: draft.end_date,
            budget: draft.budget,
            status: draft.status.unwrap_or_default(),
            progress: 0,
            manager: draft.manager,
            priority: draft.priority.unwrap_or(priority),
            sub_projects: Vec::new(),
        }
    }

    pub(crate) fn apply(&mut self, draft: BigProjectDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.start_date = draft.start_date;
        self.end_date = draft.end_date;
        self.budget = draft.budget;
        if let Some(status) = draft.status {
            self.status = status;
        }
        self.manager = draft.manager;
        if let Some(priority) = draft.priority {
            self.priority = priority;
        }
    }

    pub fn sub_project(&self, sub_project_id: SubProjectId) -> Option<&SubProject> {
        self.sub_projects.iter().find(|sp| sp.id == sub_project_id)
    }

    pub fn sub_project_mut(&mut self, sub_project_id: SubProjectId) -> Option<&mut SubProject> {
        self.sub_projects.iter_mut().find(|sp| sp.id == sub_project_id)
    }

    pub fn duration(&self) -> String {
        describe_date_span(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubProject {
    pub id: SubProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Schedule,
    pub assignee: Option<String>,
    #[serde(default)]
    pub tasks: Vec<SubProjectTask>,
}

impl SubProject {
    pub(crate) fn from_draft(id: SubProjectId, draft: SubProjectDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            schedule: draft.schedule,
            assignee: draft.assignee,
            tasks: Vec::new(),
        }
    }

    pub(crate) fn apply(&mut self, draft: SubProjectDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.schedule = draft.schedule;
        self.assignee = draft.assignee;
    }

    pub fn task(&self, task_id: SubProjectTaskId) -> Option<&SubProjectTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: SubProjectTaskId) -> Option<&mut SubProjectTask> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    /// Sub-projects show their span by date only.
    pub fn duration(&self) -> String {
        self.schedule.describe_dates()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubProjectTask {
    pub id: SubProjectTaskId,
    pub sub_project_id: SubProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub schedule: Schedule,
    pub assignee: Option<String>,
}

impl SubProjectTask {
    pub(crate) fn from_draft(
        id: SubProjectTaskId,
        sub_project_id: SubProjectId,
        draft: TaskDraft,
    ) -> Self {
        Self {
            id,
            sub_project_id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::NotStarted,
            schedule: draft.schedule,
            assignee: draft.assignee,
        }
    }

    pub(crate) fn apply(&mut self, draft: TaskDraft, status: TaskStatus) {
        self.title = draft.title;
        self.description = draft.description;
        self.schedule = draft.schedule;
        self.assignee = draft.assignee;
        self.status = status;
    }

    pub fn duration(&self) -> String {
        self.schedule.describe()
    }
}

/// User-entered fields for a [`BigProject`].
///
/// `status` and `priority` left as `None` keep the current value on edit and
/// fall back to defaults on create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BigProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub budget: u64,
    pub status: Option<BigProjectStatus>,
    pub manager: Option<String>,
    pub priority: Option<Priority>,
}

impl BigProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName {
                entity: EntityKind::BigProject,
            });
        }
        check_date_order(EntityKind::BigProject, self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubProjectDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Schedule,
    pub assignee: Option<String>,
}

impl SubProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName {
                entity: EntityKind::SubProject,
            });
        }
        self.schedule.check_order(EntityKind::SubProject)
    }
}
