//! Gantt layout over both task hierarchies.
//!
//! Every dated task is placed in one month-aligned window. Positions are
//! fractions of the window in percent, so the presentation layer can scale
//! them to any width.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{TaskKey, TaskStatus};
use crate::store::EntityStore;

/// One row of the Gantt chart, projected from a project task or a
/// sub-project task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttTask {
    /// Where the row came from. Task ids alone are ambiguous across hierarchies.
    pub key: TaskKey,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub assignee: String,
    pub status: TaskStatus,
}

/// Month-aligned display range: `start` is always the 1st of a month and `end`
/// the last day of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineWindow {
    /// Smallest whole-month window that contains both dates.
    pub fn enclosing(min: NaiveDate, max: NaiveDate) -> Self {
        Self {
            start: first_of_month(min),
            end: last_of_month(max),
        }
    }

    /// First day of every month in the window, in order.
    pub fn month_starts(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            months.push(current);
            match current.checked_add_months(Months::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        months
    }

    /// `["4月", "5月", "6月"]` for an April–June window.
    pub fn month_labels(&self) -> Vec<String> {
        self.month_starts()
            .iter()
            .map(|m| format!("{}月", m.month()))
            .collect()
    }

    /// Days from the window start: the full length of every month strictly
    /// between the window's first month and the date's month, plus the
    /// date's day-of-month minus one.
    pub fn day_index(&self, date: NaiveDate) -> i64 {
        let month_diff = (date.year() - self.start.year()) * 12
            + date.month() as i32
            - self.start.month() as i32;

        let whole_months: i64 = (0..month_diff.max(0))
            .filter_map(|i| self.start.checked_add_months(Months::new(i as u32)))
            .map(days_in_month)
            .sum();

        whole_months + i64::from(date.day0())
    }

    pub fn total_days(&self) -> i64 {
        self.day_index(self.end) + 1
    }

    /// Horizontal placement of a date range in percent of the window width.
    pub fn place(&self, start: NaiveDate, end: NaiveDate) -> (f64, f64) {
        let total = self.total_days() as f64;
        let start_index = self.day_index(start);
        let end_index = self.day_index(end);
        let left = start_index as f64 / total * 100.0;
        let width = (end_index - start_index + 1) as f64 / total * 100.0;
        (left, width)
    }
}

impl Default for TimelineWindow {
    /// April through June 2024, shown before any dated task exists.
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// An RGB color for a task bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

// ── Palette ──────────────────────────────────────────────────────────────────

pub const COLOR_COMPLETED: Rgb = Rgb(0x4C, 0xAF, 0x50);
pub const COLOR_IN_PROGRESS: Rgb = Rgb(0x21, 0x96, 0xF3);
pub const COLOR_NOT_STARTED: Rgb = Rgb(0xFF, 0xA0, 0x7A);
pub const COLOR_DEFAULT: Rgb = Rgb(0xFF, 0xE4, 0xB5);

/// Bar color for a status; `None` gets the default color.
pub fn status_color(status: Option<TaskStatus>) -> Rgb {
    match status {
        Some(TaskStatus::Completed) => COLOR_COMPLETED,
        Some(TaskStatus::InProgress) => COLOR_IN_PROGRESS,
        Some(TaskStatus::NotStarted) => COLOR_NOT_STARTED,
        None => COLOR_DEFAULT,
    }
}

/// Rendered placement of one Gantt row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarGeometry {
    /// Offset from the window start, in percent.
    pub left: f64,
    /// Bar length, in percent.
    pub width: f64,
    pub color: Rgb,
}

impl BarGeometry {
    /// Convert to pixel offsets for a chart of the given width.
    pub fn to_pixels(&self, chart_width: f32) -> (f32, f32) {
        let scale = chart_width as f64 / 100.0;
        ((self.left * scale) as f32, (self.width * scale) as f32)
    }
}

/// Collect every task that has both dates, projects before big projects,
/// then sort by start date. The sort is stable, so equal start dates keep
/// discovery order.
pub fn collect_gantt_tasks(store: &EntityStore, unassigned_label: &str) -> Vec<GanttTask> {
    let mut tasks: Vec<GanttTask> = store
        .all_tasks()
        .filter_map(|task| {
            let (start, end) = task.schedule().date_range()?;
            Some(GanttTask {
                key: task.key(),
                name: task.title().to_string(),
                start,
                end,
                assignee: task
                    .assignee()
                    .filter(|a| !a.trim().is_empty())
                    .unwrap_or(unassigned_label)
                    .to_string(),
                status: task.status(),
            })
        })
        .collect();
    tasks.sort_by_key(|t| t.start);
    tasks
}

/// The Gantt layout recomputed after every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct Timeline {
    tasks: Vec<GanttTask>,
    window: TimelineWindow,
    months: Vec<String>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(TimelineWindow::default())
    }
}

impl Timeline {
    pub fn new(window: TimelineWindow) -> Self {
        Self {
            tasks: Vec::new(),
            months: window.month_labels(),
            window,
        }
    }

    /// Rebuild rows, window and month labels from the store.
    ///
    /// With no dated tasks the rows are cleared but the previous window and
    /// month labels are kept.
    pub fn recompute(&mut self, store: &EntityStore, unassigned_label: &str) {
        self.tasks = collect_gantt_tasks(store, unassigned_label);

        let min = self.tasks.iter().flat_map(|t| [t.start, t.end]).min();
        let max = self.tasks.iter().flat_map(|t| [t.start, t.end]).max();
        if let (Some(min), Some(max)) = (min, max) {
            self.window = TimelineWindow::enclosing(min, max);
            self.months = self.window.month_labels();
        }
    }

    pub fn tasks(&self) -> &[GanttTask] {
        &self.tasks
    }

    pub fn window(&self) -> TimelineWindow {
        self.window
    }

    pub fn months(&self) -> &[String] {
        &self.months
    }

    pub fn bar(&self, task: &GanttTask) -> BarGeometry {
        let (left, width) = self.window.place(task.start, task.end);
        BarGeometry {
            left,
            width,
            color: status_color(Some(task.status)),
        }
    }

    pub fn bars(&self) -> impl Iterator<Item = (&GanttTask, BarGeometry)> {
        self.tasks.iter().map(move |task| (task, self.bar(task)))
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

fn days_in_month(first: NaiveDate) -> i64 {
    i64::from(last_of_month(first).day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BigProjectDraft, ProjectDraft, Schedule, SubProjectDraft, TaskDraft};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn store_with_tasks(ranges: &[(NaiveDate, NaiveDate)]) -> EntityStore {
        let mut store = EntityStore::new();
        let project = store
            .add_project(ProjectDraft::new("P", Schedule::new(d(2024, 1, 1), d(2024, 12, 31))))
            .unwrap();
        for (i, (start, end)) in ranges.iter().enumerate() {
            store
                .add_task(
                    project,
                    TaskDraft::new(format!("t{i}")).with_schedule(Schedule::new(*start, *end)),
                )
                .unwrap();
        }
        store
    }

    #[test]
    fn window_snaps_to_whole_months() {
        let store = store_with_tasks(&[
            (d(2024, 6, 5), d(2024, 6, 15)),
            (d(2024, 4, 10), d(2024, 4, 20)),
        ]);
        let mut timeline = Timeline::default();
        timeline.recompute(&store, "未割当");

        assert_eq!(
            timeline.window(),
            TimelineWindow {
                start: d(2024, 4, 1),
                end: d(2024, 6, 30)
            }
        );
        assert_eq!(timeline.months(), ["4月", "5月", "6月"]);
        // sorted by start date
        assert_eq!(timeline.tasks()[0].name, "t1");
    }

    #[test]
    fn window_end_handles_february_and_year_wrap() {
        let window = TimelineWindow::enclosing(d(2023, 11, 15), d(2024, 2, 3));
        assert_eq!(window.start, d(2023, 11, 1));
        assert_eq!(window.end, d(2024, 2, 29));
        assert_eq!(window.month_labels(), ["11月", "12月", "1月", "2月"]);
    }

    #[test]
    fn day_index_sums_real_month_lengths() {
        let window = TimelineWindow::enclosing(d(2024, 1, 1), d(2024, 3, 31));
        assert_eq!(window.day_index(d(2024, 1, 1)), 0);
        assert_eq!(window.day_index(d(2024, 2, 1)), 31);
        assert_eq!(window.day_index(d(2024, 3, 1)), 31 + 29);
        assert_eq!(window.total_days(), 31 + 29 + 31);
        for date in [d(2024, 1, 17), d(2024, 2, 29), d(2024, 3, 30)] {
            assert_eq!(window.day_index(date), (date - window.start).num_days());
        }
    }

    #[test]
    fn bar_covers_the_whole_window_for_a_full_range_task() {
        let store = store_with_tasks(&[(d(2024, 4, 1), d(2024, 6, 30))]);
        let mut timeline = Timeline::default();
        timeline.recompute(&store, "未割当");
        let bar = timeline.bar(&timeline.tasks()[0]);
        assert_eq!(bar.left, 0.0);
        assert!((bar.width - 100.0).abs() < 1e-9);
        assert_eq!(bar.color, COLOR_NOT_STARTED);
    }

    #[test]
    fn bars_never_overflow_the_window() {
        let store = store_with_tasks(&[
            (d(2024, 4, 10), d(2024, 4, 20)),
            (d(2024, 5, 31), d(2024, 6, 30)),
            (d(2024, 6, 5), d(2024, 6, 15)),
        ]);
        let mut timeline = Timeline::default();
        timeline.recompute(&store, "未割当");
        for (_, bar) in timeline.bars() {
            assert!(bar.left >= 0.0);
            assert!(bar.left + bar.width <= 100.0 + 1e-9);
        }
        let (_, first) = timeline.bars().next().unwrap();
        // 9 days into a 91-day window, 11 days long
        assert!((first.left - 9.0 / 91.0 * 100.0).abs() < 1e-9);
        assert!((first.width - 11.0 / 91.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_task_set_keeps_previous_window() {
        let store = store_with_tasks(&[(d(2025, 1, 10), d(2025, 2, 20))]);
        let mut timeline = Timeline::default();
        timeline.recompute(&store, "未割当");
        let window = timeline.window();

        timeline.recompute(&EntityStore::new(), "未割当");
        assert!(timeline.tasks().is_empty());
        assert_eq!(timeline.window(), window);
        assert_eq!(timeline.months(), ["1月", "2月"]);
    }

    #[test]
    fn undated_tasks_are_skipped_and_unassigned_gets_label() {
        let mut store = store_with_tasks(&[(d(2024, 4, 1), d(2024, 4, 2))]);
        let project = store.projects()[0].id;
        store.add_task(project, TaskDraft::new("undated")).unwrap();
        let mut timeline = Timeline::default();
        timeline.recompute(&store, "nobody");
        assert_eq!(timeline.tasks().len(), 1);
        assert_eq!(timeline.tasks()[0].assignee, "nobody");
    }

    #[test]
    fn equal_start_dates_keep_projects_before_big_projects() {
        let mut store = EntityStore::new();
        let bp = store.add_big_project(BigProjectDraft::new("BP")).unwrap();
        let sp = store.add_sub_project(bp, SubProjectDraft::new("SP")).unwrap().unwrap();
        store
            .add_sub_project_task(
                bp,
                sp,
                TaskDraft::new("nested").with_schedule(Schedule::new(d(2024, 4, 1), d(2024, 4, 3))),
            )
            .unwrap();
        let project = store
            .add_project(ProjectDraft::new("P", Schedule::new(d(2024, 4, 1), d(2024, 4, 30))))
            .unwrap();
        store
            .add_task(
                project,
                TaskDraft::new("flat").with_schedule(Schedule::new(d(2024, 4, 1), d(2024, 4, 2))),
            )
            .unwrap();

        let tasks = collect_gantt_tasks(&store, "-");
        assert_eq!(tasks[0].name, "flat");
        assert_eq!(tasks[1].name, "nested");
        assert!(matches!(tasks[1].key, TaskKey::SubProject { .. }));
    }

    #[test]
    fn status_colors() {
        assert_eq!(status_color(Some(TaskStatus::Completed)).hex(), "#4CAF50");
        assert_eq!(status_color(Some(TaskStatus::InProgress)).hex(), "#2196F3");
        assert_eq!(status_color(Some(TaskStatus::NotStarted)).hex(), "#FFA07A");
        assert_eq!(status_color(None).hex(), "#FFE4B5");
    }

    #[test]
    fn bar_to_pixels_scales_percentages() {
        let bar = BarGeometry {
            left: 25.0,
            width: 50.0,
            color: COLOR_DEFAULT,
        };
        assert_eq!(bar.to_pixels(800.0), (200.0, 400.0));
    }
}
