//! Completion roll-up: task → project, and task → sub-project → big project.
//!
//! Big-project progress is computed over the flattened task list of all its
//! sub-projects, so a sub-project with many tasks weighs more than one with
//! few. It is not an average of per-sub-project percentages.

use serde::Serialize;

use crate::model::{BigProject, BigProjectId, Project, ProjectId, SubProject, TaskStatus};
use crate::store::EntityStore;

/// Completed and total task counts for one aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub completed: usize,
    pub total: usize,
}

impl Completion {
    fn from_statuses(statuses: impl Iterator<Item = TaskStatus>) -> Self {
        statuses.fold(Self::default(), |acc, status| Self {
            completed: acc.completed + usize::from(status.is_completed()),
            total: acc.total + 1,
        })
    }

    /// `round(100 × completed / total)`, or 0 with no tasks.
    pub fn percent(&self) -> u8 {
        completion_percent(self.completed, self.total)
    }

    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }
}

/// Integer percentage rounded half up, without going through floats.
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

pub fn project_completion(project: &Project) -> Completion {
    Completion::from_statuses(project.tasks.iter().map(|t| t.status))
}

pub fn sub_project_completion(sub_project: &SubProject) -> Completion {
    Completion::from_statuses(sub_project.tasks.iter().map(|t| t.status))
}

pub fn big_project_completion(big_project: &BigProject) -> Completion {
    Completion::from_statuses(
        big_project
            .sub_projects
            .iter()
            .flat_map(|sp| sp.tasks.iter().map(|t| t.status)),
    )
}

/// Rewrite a project's progress from its current tasks.
///
/// Returns the new value, or `None` when the project no longer exists.
pub fn recompute_project_progress(store: &mut EntityStore, project_id: ProjectId) -> Option<u8> {
    let project = store.project_mut(project_id)?;
    project.progress = project_completion(project).percent();
    Some(project.progress)
}

/// Rewrite a big project's progress from every task of every sub-project.
pub fn recompute_big_project_progress(
    store: &mut EntityStore,
    big_project_id: BigProjectId,
) -> Option<u8> {
    let big_project = store.big_project_mut(big_project_id)?;
    big_project.progress = big_project_completion(big_project).percent();
    Some(big_project.progress)
}

/// Recompute every aggregate, e.g. after loading a snapshot whose stored
/// progress values cannot be trusted.
pub fn recompute_all(store: &mut EntityStore) {
    let project_ids: Vec<ProjectId> = store.projects().iter().map(|p| p.id).collect();
    for id in project_ids {
        recompute_project_progress(store, id);
    }
    let big_project_ids: Vec<BigProjectId> = store.big_projects().iter().map(|bp| bp.id).collect();
    for id in big_project_ids {
        recompute_big_project_progress(store, id);
    }
}
