//! Kanban-style columns across both hierarchies.

use serde::Serialize;

use crate::model::{BigProjectId, SubProjectId, TaskKey, TaskStatus};
use crate::progress::{sub_project_completion, Completion};
use crate::store::EntityStore;

/// One card on the board: a task plus where it lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardCard {
    pub key: TaskKey,
    pub title: String,
    pub status: TaskStatus,
    /// Project name, or `"BigProject > SubProject"` for nested tasks.
    pub parent_label: String,
    pub duration: String,
    pub assignee: Option<String>,
}

/// Every task with `status`, project tasks first.
pub fn tasks_by_status(store: &EntityStore, status: TaskStatus) -> Vec<BoardCard> {
    store
        .all_tasks()
        .filter(|task| task.status() == status)
        .map(|task| BoardCard {
            key: task.key(),
            title: task.title().to_string(),
            status: task.status(),
            parent_label: task.parent_label(),
            duration: task.duration(),
            assignee: task.assignee().map(str::to_string),
        })
        .collect()
}

/// All three columns in display order.
pub fn board(store: &EntityStore) -> Vec<(TaskStatus, Vec<BoardCard>)> {
    TaskStatus::ALL
        .iter()
        .map(|status| (*status, tasks_by_status(store, *status)))
        .collect()
}

/// Completed/remaining counters for a sub-project card.
pub fn sub_project_counts(
    store: &EntityStore,
    big_project_id: BigProjectId,
    sub_project_id: SubProjectId,
) -> Option<Completion> {
    store
        .sub_project(big_project_id, sub_project_id)
        .map(sub_project_completion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BigProjectDraft, ProjectDraft, Schedule, SubProjectDraft, TaskDraft};
    use chrono::NaiveDate;

    fn store_with_both_hierarchies() -> (EntityStore, TaskKey, TaskKey) {
        let mut store = EntityStore::new();
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
        );
        let p = store.add_project(ProjectDraft::new("Event", schedule)).unwrap();
        let flat = store.add_task(p, TaskDraft::new("Venue")).unwrap().unwrap();
        store.add_task(p, TaskDraft::new("Catering")).unwrap();

        let bp = store.add_big_project(BigProjectDraft::new("Platform")).unwrap();
        let sp = store.add_sub_project(bp, SubProjectDraft::new("API")).unwrap().unwrap();
        let nested = store
            .add_sub_project_task(bp, sp, TaskDraft::new("Auth"))
            .unwrap()
            .unwrap();
        store.add_sub_project_task(bp, sp, TaskDraft::new("Docs")).unwrap();
        (store, flat, nested)
    }

    #[test]
    fn columns_mix_both_hierarchies() {
        let (mut store, flat, nested) = store_with_both_hierarchies();
        store.set_task_status(flat, TaskStatus::Completed).unwrap();
        store.set_task_status(nested, TaskStatus::Completed).unwrap();

        let done = tasks_by_status(&store, TaskStatus::Completed);
        let labels: Vec<&str> = done.iter().map(|c| c.parent_label.as_str()).collect();
        assert_eq!(labels, ["Event", "Platform > API"]);
        assert_eq!(done[0].key, flat);
        assert_eq!(done[1].key, nested);

        let columns = board(&store);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].0, TaskStatus::NotStarted);
        assert_eq!(columns[0].1.len(), 2);
        assert!(columns[1].1.is_empty());
    }

    #[test]
    fn sub_project_counts_track_completion() {
        let (mut store, _, nested) = store_with_both_hierarchies();
        store.set_task_status(nested, TaskStatus::Completed).unwrap();
        let counts = sub_project_counts(&store, 1, 1).unwrap();
        assert_eq!((counts.completed, counts.remaining(), counts.percent()), (1, 1, 50));
        assert!(sub_project_counts(&store, 1, 99).is_none());
    }
}
