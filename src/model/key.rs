use serde::{Deserialize, Serialize};

use super::big_project::{BigProject, BigProjectId, SubProject, SubProjectId, SubProjectTask};
use super::project::{Project, ProjectId};
use super::task::{Task, TaskId};
use super::TaskStatus;

/// Composite key that locates a task in either hierarchy without scanning.
///
/// Task ids repeat across projects, so the parent ids are part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TaskKey {
    #[serde(rename_all = "camelCase")]
    Project {
        project_id: ProjectId,
        task_id: TaskId,
    },
    #[serde(rename_all = "camelCase")]
    SubProject {
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        task_id: TaskId,
    },
}

impl TaskKey {
    pub fn task_id(&self) -> TaskId {
        match self {
            Self::Project { task_id, .. } | Self::SubProject { task_id, .. } => *task_id,
        }
    }
}

/// Borrowed view of a task resolved through a [`TaskKey`], with its owners.
#[derive(Debug, Clone, Copy)]
pub enum TaskRef<'a> {
    Project {
        project: &'a Project,
        task: &'a Task,
    },
    SubProject {
        big_project: &'a BigProject,
        sub_project: &'a SubProject,
        task: &'a SubProjectTask,
    },
}

impl<'a> TaskRef<'a> {
    pub fn key(&self) -> TaskKey {
        match self {
            Self::Project { project, task } => TaskKey::Project {
                project_id: project.id,
                task_id: task.id,
            },
            Self::SubProject {
                big_project,
                sub_project,
                task,
            } => TaskKey::SubProject {
                big_project_id: big_project.id,
                sub_project_id: sub_project.id,
                task_id: task.id,
            },
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Self::Project { task, .. } => &task.title,
            Self::SubProject { task, .. } => &task.title,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Self::Project { task, .. } => task.status,
            Self::SubProject { task, .. } => task.status,
        }
    }

    pub fn assignee(&self) -> Option<&'a str> {
        match self {
            Self::Project { task, .. } => task.assignee.as_deref(),
            Self::SubProject { task, .. } => task.assignee.as_deref(),
        }
    }

    pub fn schedule(&self) -> &'a super::Schedule {
        match self {
            Self::Project { task, .. } => &task.schedule,
            Self::SubProject { task, .. } => &task.schedule,
        }
    }

    /// Owning project name, or `"BigProject > SubProject"`.
    pub fn parent_label(&self) -> String {
        match self {
            Self::Project { project, .. } => project.name.clone(),
            Self::SubProject {
                big_project,
                sub_project,
                ..
            } => format!("{} > {}", big_project.name, sub_project.name),
        }
    }

    pub fn duration(&self) -> String {
        self.schedule().describe()
    }
}
