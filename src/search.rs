//! Cross-entity search.
//!
//! # Invariants
//! - Blank queries return nothing without scanning.
//! - Matching is a case-insensitive substring test on title/name or description.
//! - No ranking. Results come in collection order: projects, tasks, big
//!   projects, then sub-projects each followed by their matching tasks.

use serde::{Deserialize, Serialize};

use crate::model::{BigProjectId, EntityKind, ProjectId, SubProjectId, TaskKey};
use crate::store::EntityStore;

/// Per-collection switches. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub projects: bool,
    pub tasks: bool,
    pub big_projects: bool,
    /// Covers sub-projects and their tasks.
    pub sub_projects: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            projects: true,
            tasks: true,
            big_projects: true,
            sub_projects: true,
        }
    }
}

/// What a search result points at, for navigation or edit dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EntityRef {
    Project {
        id: ProjectId,
    },
    Task {
        key: TaskKey,
    },
    BigProject {
        id: BigProjectId,
    },
    #[serde(rename_all = "camelCase")]
    SubProject {
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    },
}

/// One normalized hit, regardless of the entity kind it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: u32,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub type_label: String,
    pub parent: Option<String>,
    pub dates: String,
    pub status: Option<String>,
    pub project_id: Option<ProjectId>,
    pub big_project_id: Option<BigProjectId>,
    pub sub_project_id: Option<SubProjectId>,
}

impl SearchResult {
    fn new(kind: EntityKind, id: u32, title: &str, description: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            kind,
            type_label: kind.label().to_string(),
            parent: None,
            dates: String::new(),
            status: None,
            project_id: None,
            big_project_id: None,
            sub_project_id: None,
        }
    }

    /// Resolve the foreign keys carried by this result into a target.
    ///
    /// `None` when a key the kind needs is missing.
    pub fn target(&self) -> Option<EntityRef> {
        match self.kind {
            EntityKind::Project => Some(EntityRef::Project { id: self.id }),
            EntityKind::Task => Some(EntityRef::Task {
                key: TaskKey::Project {
                    project_id: self.project_id?,
                    task_id: self.id,
                },
            }),
            EntityKind::BigProject => Some(EntityRef::BigProject { id: self.id }),
            EntityKind::SubProject => Some(EntityRef::SubProject {
                big_project_id: self.big_project_id?,
                sub_project_id: self.id,
            }),
            EntityKind::SubProjectTask => Some(EntityRef::Task {
                key: TaskKey::SubProject {
                    big_project_id: self.big_project_id?,
                    sub_project_id: self.sub_project_id?,
                    task_id: self.id,
                },
            }),
        }
    }
}

fn matches(needle: &str, title: &str, description: &str) -> bool {
    title.to_lowercase().contains(needle) || description.to_lowercase().contains(needle)
}

/// Scan all four collections for `query`.
pub fn search(store: &EntityStore, query: &str, filters: SearchFilters) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let needle = query.to_lowercase();
    let mut results = Vec::new();

    if filters.projects {
        for project in store.projects() {
            if matches(&needle, &project.name, &project.description) {
                let mut hit = SearchResult::new(
                    EntityKind::Project,
                    project.id,
                    &project.name,
                    &project.description,
                );
                hit.dates = project.duration();
                hit.status = Some(format!("{}%", project.progress));
                results.push(hit);
            }
        }
    }

    if filters.tasks {
        for project in store.projects() {
            for task in &project.tasks {
                if matches(&needle, &task.title, &task.description) {
                    let mut hit =
                        SearchResult::new(EntityKind::Task, task.id, &task.title, &task.description);
                    hit.parent = Some(project.name.clone());
                    hit.dates = task.duration();
                    hit.status = Some(task.status.as_str().to_string());
                    hit.project_id = Some(project.id);
                    results.push(hit);
                }
            }
        }
    }

    if filters.big_projects {
        for big_project in store.big_projects() {
            if matches(&needle, &big_project.name, &big_project.description) {
                let mut hit = SearchResult::new(
                    EntityKind::BigProject,
                    big_project.id,
                    &big_project.name,
                    &big_project.description,
                );
                hit.dates = big_project.duration();
                hit.status = Some(big_project.status.as_str().to_string());
                results.push(hit);
            }
        }
    }

    if filters.sub_projects {
        for big_project in store.big_projects() {
            for sub_project in &big_project.sub_projects {
                if matches(&needle, &sub_project.name, &sub_project.description) {
                    let mut hit = SearchResult::new(
                        EntityKind::SubProject,
                        sub_project.id,
                        &sub_project.name,
                        &sub_project.description,
                    );
                    hit.parent = Some(big_project.name.clone());
                    hit.dates = sub_project.duration();
                    hit.big_project_id = Some(big_project.id);
                    results.push(hit);
                }

                for task in &sub_project.tasks {
                    if matches(&needle, &task.title, &task.description) {
                        let mut hit = SearchResult::new(
                            EntityKind::SubProjectTask,
                            task.id,
                            &task.title,
                            &task.description,
                        );
                        hit.parent = Some(format!("{} > {}", big_project.name, sub_project.name));
                        hit.dates = task.duration();
                        hit.status = Some(task.status.as_str().to_string());
                        hit.big_project_id = Some(big_project.id);
                        hit.sub_project_id = Some(sub_project.id);
                        results.push(hit);
                    }
                }
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BigProjectDraft, ProjectDraft, Schedule, SubProjectDraft, TaskDraft};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn seeded() -> EntityStore {
        let mut store = EntityStore::new();
        let project = store
            .add_project(ProjectDraft {
                description: "Spring launch event".into(),
                ..ProjectDraft::new("Launch", Schedule::new(d(2024, 4, 1), d(2024, 6, 30)))
            })
            .unwrap();
        store
            .add_task(
                project,
                TaskDraft {
                    description: "book the launch venue".into(),
                    ..TaskDraft::new("Venue")
                },
            )
            .unwrap();
        let bp = store
            .add_big_project(BigProjectDraft {
                description: "Regional launch roadmap".into(),
                ..BigProjectDraft::new("Roadmap")
            })
            .unwrap();
        let sp = store
            .add_sub_project(bp, SubProjectDraft::new("Launch prep"))
            .unwrap()
            .unwrap();
        store
            .add_sub_project_task(bp, sp, TaskDraft::new("Print LAUNCH flyers"))
            .unwrap();
        store
    }

    #[test]
    fn blank_query_returns_nothing() {
        let store = seeded();
        assert!(search(&store, "", SearchFilters::default()).is_empty());
        assert!(search(&store, "   \t", SearchFilters::default()).is_empty());
    }

    #[test]
    fn results_follow_collection_order() {
        let store = seeded();
        let kinds: Vec<EntityKind> = search(&store, "launch", SearchFilters::default())
            .into_iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(
            kinds,
            [
                EntityKind::Project,
                EntityKind::Task,
                EntityKind::BigProject,
                EntityKind::SubProject,
                EntityKind::SubProjectTask,
            ]
        );
    }

    #[test]
    fn description_only_match_is_returned() {
        let store = seeded();
        let results = search(&store, "VENUE", SearchFilters::default());
        assert_eq!(results.len(), 1);
        let results = search(&store, "roadmap", SearchFilters::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, EntityKind::BigProject);
        assert_eq!(results[0].status.as_deref(), Some("planning"));

        let results = search(&store, "spring", SearchFilters::default());
        assert_eq!(results[0].title, "Launch");
    }

    #[test]
    fn filters_gate_each_collection() {
        let store = seeded();
        let filters = SearchFilters {
            projects: false,
            tasks: false,
            big_projects: false,
            sub_projects: true,
        };
        let results = search(&store, "launch", filters);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.big_project_id == Some(1)));
    }

    #[test]
    fn results_carry_parent_labels_and_targets() {
        let store = seeded();
        let results = search(&store, "launch", SearchFilters::default());

        let project = &results[0];
        assert_eq!(project.status.as_deref(), Some("0%"));
        assert_eq!(project.type_label, "プロジェクト");
        assert_eq!(project.dates, "2024-04-01 00:00 ～ 2024-06-30 00:00（90日間）");

        let task = &results[1];
        assert_eq!(task.parent.as_deref(), Some("Launch"));
        assert_eq!(
            task.target(),
            Some(EntityRef::Task {
                key: TaskKey::Project {
                    project_id: 1,
                    task_id: 1
                }
            })
        );

        let sub_project = &results[3];
        assert_eq!(sub_project.parent.as_deref(), Some("Roadmap"));
        assert_eq!(sub_project.status, None);

        let nested = &results[4];
        assert_eq!(nested.parent.as_deref(), Some("Roadmap > Launch prep"));
        assert_eq!(nested.status.as_deref(), Some("not-started"));
        assert_eq!(
            nested.target(),
            Some(EntityRef::Task {
                key: TaskKey::SubProject {
                    big_project_id: 1,
                    sub_project_id: 1,
                    task_id: 1
                }
            })
        );
    }

    #[test]
    fn target_needs_foreign_keys() {
        let mut orphan = SearchResult::new(EntityKind::Task, 3, "t", "");
        assert_eq!(orphan.target(), None);
        orphan.project_id = Some(2);
        assert!(orphan.target().is_some());
    }
}
