//! In-memory entity tables.
//!
//! # Invariants
//! - Every create/update validates its draft first; a rejected draft leaves
//!   the store untouched.
//! - Projects own their tasks and big projects own their sub-projects, so a
//!   delete cascades by dropping the owned `Vec`.
//! - Project, big-project, sub-project and sub-project-task ids come from
//!   monotonic counters that never move backwards. Project task ids are
//!   `max + 1` within the owning project.
//! - An operation that names a missing parent or entity is a no-op and reports
//!   it as `None`/`false`, never as an error.
//!
//! Progress values are not touched here; see [`crate::progress`].

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::{
    BigProject, BigProjectDraft, BigProjectId, EntityKind, Priority, Project, ProjectDraft,
    ProjectId, SubProject, SubProjectDraft, SubProjectId, SubProjectTask, SubProjectTaskId, Task,
    TaskDraft, TaskId, TaskKey, TaskRef, TaskStatus,
};

/// Serializable contents of an [`EntityStore`], as handed over by the
/// persistence collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub big_projects: Vec<BigProject>,
}

#[derive(Debug, Clone)]
pub struct EntityStore {
    projects: Vec<Project>,
    big_projects: Vec<BigProject>,
    next_project_id: ProjectId,
    next_big_project_id: BigProjectId,
    next_sub_project_id: SubProjectId,
    next_sub_project_task_id: SubProjectTaskId,
    default_priority: Priority,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            big_projects: Vec::new(),
            next_project_id: 1,
            next_big_project_id: 1,
            next_sub_project_id: 1,
            next_sub_project_task_id: 1,
            default_priority: Priority::Low,
        }
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Priority given to big projects created without one.
    pub fn with_default_priority(mut self, priority: Priority) -> Self {
        self.default_priority = priority;
        self
    }

    /// Rebuild a store from persisted entities. Counters resume past the
    /// largest id found for each kind.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            projects,
            big_projects,
        } = snapshot;

        let next_project_id = projects.iter().map(|p| p.id).max().map_or(1, |m| m + 1);
        let next_big_project_id = big_projects.iter().map(|bp| bp.id).max().map_or(1, |m| m + 1);
        let next_sub_project_id = big_projects
            .iter()
            .flat_map(|bp| bp.sub_projects.iter().map(|sp| sp.id))
            .max()
            .map_or(1, |m| m + 1);
        let next_sub_project_task_id = big_projects
            .iter()
            .flat_map(|bp| bp.sub_projects.iter())
            .flat_map(|sp| sp.tasks.iter().map(|t| t.id))
            .max()
            .map_or(1, |m| m + 1);

        Self {
            projects,
            big_projects,
            next_project_id,
            next_big_project_id,
            next_sub_project_id,
            next_sub_project_task_id,
            ..Default::default()
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            projects: self.projects.clone(),
            big_projects: self.big_projects.clone(),
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────────────

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn big_projects(&self) -> &[BigProject] {
        &self.big_projects
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub(crate) fn project_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn task(&self, project_id: ProjectId, task_id: TaskId) -> Option<&Task> {
        self.project(project_id)?.task(task_id)
    }

    pub fn big_project(&self, id: BigProjectId) -> Option<&BigProject> {
        self.big_projects.iter().find(|bp| bp.id == id)
    }

    pub(crate) fn big_project_mut(&mut self, id: BigProjectId) -> Option<&mut BigProject> {
        self.big_projects.iter_mut().find(|bp| bp.id == id)
    }

    pub fn sub_project(
        &self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    ) -> Option<&SubProject> {
        self.big_project(big_project_id)?.sub_project(sub_project_id)
    }

    fn sub_project_mut(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    ) -> Option<&mut SubProject> {
        self.big_project_mut(big_project_id)?
            .sub_project_mut(sub_project_id)
    }

    /// Owning big project of a sub-project, found by scanning every big project.
    pub fn big_project_id_of_sub_project(&self, sub_project_id: SubProjectId) -> Option<BigProjectId> {
        self.big_projects
            .iter()
            .find(|bp| bp.sub_project(sub_project_id).is_some())
            .map(|bp| bp.id)
    }

    /// Resolve a composite key back to the task and its owners.
    pub fn resolve(&self, key: TaskKey) -> Option<TaskRef<'_>> {
        match key {
            TaskKey::Project {
                project_id,
                task_id,
            } => {
                let project = self.project(project_id)?;
                let task = project.task(task_id)?;
                Some(TaskRef::Project { project, task })
            }
            TaskKey::SubProject {
                big_project_id,
                sub_project_id,
                task_id,
            } => {
                let big_project = self.big_project(big_project_id)?;
                let sub_project = big_project.sub_project(sub_project_id)?;
                let task = sub_project.task(task_id)?;
                Some(TaskRef::SubProject {
                    big_project,
                    sub_project,
                    task,
                })
            }
        }
    }

    /// Display label of the task's owner: the project name, or
    /// `"BigProject > SubProject"`. `None` when the key no longer resolves.
    pub fn parent_label(&self, key: TaskKey) -> Option<String> {
        self.resolve(key).map(|task| task.parent_label())
    }

    /// Every task of both hierarchies: projects first, then big projects'
    /// sub-projects, each in insertion order.
    pub fn all_tasks(&self) -> impl Iterator<Item = TaskRef<'_>> {
        let project_tasks = self.projects.iter().flat_map(|project| {
            project
                .tasks
                .iter()
                .map(move |task| TaskRef::Project { project, task })
        });
        let sub_project_tasks = self.big_projects.iter().flat_map(|big_project| {
            big_project.sub_projects.iter().flat_map(move |sub_project| {
                sub_project.tasks.iter().map(move |task| TaskRef::SubProject {
                    big_project,
                    sub_project,
                    task,
                })
            })
        });
        project_tasks.chain(sub_project_tasks)
    }

    // ── Projects ─────────────────────────────────────────────────────────────

    pub fn add_project(&mut self, draft: ProjectDraft) -> Result<ProjectId, ValidationError> {
        draft.validate()?;
        let id = self.next_project_id;
        self.next_project_id += 1;
        self.projects.push(Project::from_draft(id, draft));
        Ok(id)
    }

    pub fn update_project(
        &mut self,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        draft.validate()?;
        Ok(self.project_mut(id).map(|project| project.apply(draft)))
    }

    /// Removes the project together with all of its tasks.
    pub fn delete_project(&mut self, id: ProjectId) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        self.projects.len() != before
    }

    // ── Project tasks ────────────────────────────────────────────────────────

    pub fn add_task(
        &mut self,
        project_id: ProjectId,
        draft: TaskDraft,
    ) -> Result<Option<TaskKey>, ValidationError> {
        draft.validate(EntityKind::Task)?;
        let Some(project) = self.project_mut(project_id) else {
            return Ok(None);
        };
        let task_id = project.next_task_id();
        project.tasks.push(Task::from_draft(task_id, project_id, draft));
        Ok(Some(TaskKey::Project {
            project_id,
            task_id,
        }))
    }

    pub fn update_task(
        &mut self,
        project_id: ProjectId,
        task_id: TaskId,
        draft: TaskDraft,
        status: TaskStatus,
    ) -> Result<Option<()>, ValidationError> {
        draft.validate(EntityKind::Task)?;
        Ok(self
            .project_mut(project_id)
            .and_then(|project| project.task_mut(task_id))
            .map(|task| task.apply(draft, status)))
    }

    pub fn delete_task(&mut self, project_id: ProjectId, task_id: TaskId) -> bool {
        let Some(project) = self.project_mut(project_id) else {
            return false;
        };
        let before = project.tasks.len();
        project.tasks.retain(|t| t.id != task_id);
        project.tasks.len() != before
    }

    /// Set the status of a task in either hierarchy. Any transition is allowed.
    pub fn set_task_status(&mut self, key: TaskKey, status: TaskStatus) -> Option<()> {
        match key {
            TaskKey::Project {
                project_id,
                task_id,
            } => {
                self.project_mut(project_id)?.task_mut(task_id)?.status = status;
            }
            TaskKey::SubProject {
                big_project_id,
                sub_project_id,
                task_id,
            } => {
                self.sub_project_mut(big_project_id, sub_project_id)?
                    .task_mut(task_id)?
                    .status = status;
            }
        }
        Some(())
    }

    // ── Big projects ─────────────────────────────────────────────────────────

    pub fn add_big_project(&mut self, draft: BigProjectDraft) -> Result<BigProjectId, ValidationError> {
        draft.validate()?;
        let id = self.next_big_project_id;
        self.next_big_project_id += 1;
        self.big_projects
            .push(BigProject::from_draft(id, draft, self.default_priority));
        Ok(id)
    }

    pub fn update_big_project(
        &mut self,
        id: BigProjectId,
        draft: BigProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        draft.validate()?;
        Ok(self.big_project_mut(id).map(|bp| bp.apply(draft)))
    }

    /// Removes the big project with every sub-project and sub-project task.
    pub fn delete_big_project(&mut self, id: BigProjectId) -> bool {
        let before = self.big_projects.len();
        self.big_projects.retain(|bp| bp.id != id);
        self.big_projects.len() != before
    }

    // ── Sub-projects ─────────────────────────────────────────────────────────

    pub fn add_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        draft: SubProjectDraft,
    ) -> Result<Option<SubProjectId>, ValidationError> {
        draft.validate()?;
        let id = self.next_sub_project_id;
        let Some(big_project) = self.big_project_mut(big_project_id) else {
            return Ok(None);
        };
        big_project.sub_projects.push(SubProject::from_draft(id, draft));
        self.next_sub_project_id += 1;
        Ok(Some(id))
    }

    pub fn update_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        draft: SubProjectDraft,
    ) -> Result<Option<()>, ValidationError> {
        draft.validate()?;
        Ok(self
            .sub_project_mut(big_project_id, sub_project_id)
            .map(|sp| sp.apply(draft)))
    }

    pub fn delete_sub_project(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    ) -> bool {
        let Some(big_project) = self.big_project_mut(big_project_id) else {
            return false;
        };
        let before = big_project.sub_projects.len();
        big_project.sub_projects.retain(|sp| sp.id != sub_project_id);
        big_project.sub_projects.len() != before
    }

    // ── Sub-project tasks ────────────────────────────────────────────────────

    pub fn add_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        draft: TaskDraft,
    ) -> Result<Option<TaskKey>, ValidationError> {
        draft.validate(EntityKind::SubProjectTask)?;
        let task_id = self.next_sub_project_task_id;
        let Some(sub_project) = self.sub_project_mut(big_project_id, sub_project_id) else {
            return Ok(None);
        };
        sub_project
            .tasks
            .push(SubProjectTask::from_draft(task_id, sub_project_id, draft));
        self.next_sub_project_task_id += 1;
        Ok(Some(TaskKey::SubProject {
            big_project_id,
            sub_project_id,
            task_id,
        }))
    }

    pub fn update_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        task_id: SubProjectTaskId,
        draft: TaskDraft,
        status: TaskStatus,
    ) -> Result<Option<()>, ValidationError> {
        draft.validate(EntityKind::SubProjectTask)?;
        Ok(self
            .sub_project_mut(big_project_id, sub_project_id)
            .and_then(|sp| sp.task_mut(task_id))
            .map(|task| task.apply(draft, status)))
    }

    pub fn delete_sub_project_task(
        &mut self,
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
        task_id: SubProjectTaskId,
    ) -> bool {
        let Some(sub_project) = self.sub_project_mut(big_project_id, sub_project_id) else {
            return false;
        };
        let before = sub_project.tasks.len();
        sub_project.tasks.retain(|t| t.id != task_id);
        sub_project.tasks.len() != before
    }
}
