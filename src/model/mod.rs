pub mod big_project;
pub mod burndown;
pub mod key;
pub mod project;
pub mod schedule;
pub mod status;
pub mod task;
pub mod timeline;

pub use big_project::{
    BigProject, BigProjectDraft, BigProjectId, SubProject, SubProjectDraft, SubProjectId,
    SubProjectTask, SubProjectTaskId,
};
pub use burndown::{Burndown, BurndownPoint, BurndownTarget};
pub use key::{TaskKey, TaskRef};
pub use project::{Project, ProjectDraft, ProjectId};
pub use schedule::Schedule;
pub use status::{BigProjectStatus, EntityKind, Priority, TaskStatus};
pub use task::{Task, TaskDraft, TaskId};
pub use timeline::{BarGeometry, GanttTask, Rgb, Timeline, TimelineWindow};
