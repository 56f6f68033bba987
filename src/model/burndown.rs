use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BigProjectId, ProjectId, SubProjectId, TaskStatus};
use crate::progress::completion_percent;
use crate::store::EntityStore;

/// The entity a burndown is drawn for. Chosen explicitly by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BurndownTarget {
    Project {
        id: ProjectId,
    },
    #[serde(rename_all = "camelCase")]
    SubProject {
        big_project_id: BigProjectId,
        sub_project_id: SubProjectId,
    },
}

/// One (date, planned %, completed %) sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurndownPoint {
    pub date: NaiveDate,
    pub planned: u8,
    pub completed: u8,
    pub label: String,
}

/// Two-point completion trend for one project or sub-project.
///
/// The planned line always runs linearly from 0 to 100 across the entity's
/// date range; the actual line ends at the current completion percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Burndown {
    pub points: Vec<BurndownPoint>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl Burndown {
    /// Project the trend for `target`.
    ///
    /// Empty, with both range fields cleared, when there is no target, the
    /// target is gone, it lacks a start or end date, or it has no tasks.
    pub fn project(store: &EntityStore, target: Option<BurndownTarget>) -> Self {
        let Some((name, range, statuses)) = target.and_then(|t| inputs(store, t)) else {
            return Self::default();
        };
        let Some((start, end)) = range else {
            return Self::default();
        };
        if statuses.is_empty() {
            return Self::default();
        }

        let completed = statuses.iter().filter(|s| s.is_completed()).count();
        let percent = completion_percent(completed, statuses.len());

        Self {
            points: vec![
                BurndownPoint {
                    date: start,
                    planned: 0,
                    completed: 0,
                    label: name.clone(),
                },
                BurndownPoint {
                    date: end,
                    planned: 100,
                    completed: percent,
                    label: name,
                },
            ],
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// SVG polyline for the actual line, e.g. `"0,0 100,67"`. Empty with no data.
    pub fn actual_polyline(&self) -> String {
        match self.points.last() {
            Some(last) => format!("0,0 100,{}", last.completed),
            None => String::new(),
        }
    }

    pub fn ideal_polyline() -> &'static str {
        "0,0 100,100"
    }

    pub fn y_axis_labels() -> [u8; 5] {
        [100, 75, 50, 25, 0]
    }
}

type BurndownInputs = (String, Option<(NaiveDate, NaiveDate)>, Vec<TaskStatus>);

fn inputs(store: &EntityStore, target: BurndownTarget) -> Option<BurndownInputs> {
    match target {
        BurndownTarget::Project { id } => {
            let project = store.project(id)?;
            Some((
                project.name.clone(),
                project.schedule.date_range(),
                project.tasks.iter().map(|t| t.status).collect(),
            ))
        }
        BurndownTarget::SubProject {
            big_project_id,
            sub_project_id,
        } => {
            let sub_project = store.sub_project(big_project_id, sub_project_id)?;
            Some((
                sub_project.name.clone(),
                sub_project.schedule.date_range(),
                sub_project.tasks.iter().map(|t| t.status).collect(),
            ))
        }
    }
}
