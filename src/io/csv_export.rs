use std::io::Write;
use std::path::Path;

use crate::error::CsvError;
use crate::model::GanttTask;
use crate::store::EntityStore;

const HEADER: [&str; 6] = ["Task", "Parent", "Assignee", "Start Date", "End Date", "Status"];

/// Write Gantt rows as semicolon-delimited CSV.
///
/// Columns: Task ; Parent ; Assignee ; Start Date ; End Date ; Status.
/// Dates are `YYYY-MM-DD`, statuses use their wire names so the file can be
/// imported again. The assignee cell is the task's own assignee, left empty
/// when it has none, never the row's display label. Returns the number of
/// rows written.
pub fn write_csv<W: Write>(
    store: &EntityStore,
    rows: &[GanttTask],
    writer: W,
) -> Result<usize, CsvError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(HEADER)?;

    for row in rows {
        let source = store.resolve(row.key);
        let parent = source.map(|task| task.parent_label()).unwrap_or_default();
        let assignee = source.and_then(|task| task.assignee()).unwrap_or_default();
        wtr.write_record([
            row.name.as_str(),
            parent.as_str(),
            assignee,
            &row.start.format("%Y-%m-%d").to_string(),
            &row.end.format("%Y-%m-%d").to_string(),
            row.status.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(rows.len())
}

/// Export Gantt rows to a file. See [`write_csv`].
pub fn export_csv(store: &EntityStore, rows: &[GanttTask], path: &Path) -> Result<usize, CsvError> {
    let file = std::fs::File::create(path)?;
    write_csv(store, rows, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timeline::collect_gantt_tasks;
    use crate::model::{ProjectDraft, Schedule, TaskDraft, TaskStatus};
    use chrono::NaiveDate;

    #[test]
    fn writes_header_and_rows() {
        let mut store = EntityStore::new();
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
        );
        let p = store.add_project(ProjectDraft::new("Event", schedule.clone())).unwrap();
        let key = store
            .add_task(p, TaskDraft::new("Venue").with_schedule(schedule).with_assignee("Sato"))
            .unwrap()
            .unwrap();
        store.set_task_status(key, TaskStatus::InProgress).unwrap();

        let rows = collect_gantt_tasks(&store, "未割当");
        let mut out = Vec::new();
        let written = write_csv(&store, &rows, &mut out).unwrap();
        assert_eq!(written, 1);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Task;Parent;Assignee;Start Date;End Date;Status");
        assert_eq!(lines[1], "Venue;Event;Sato;2024-04-01;2024-04-30;in-progress");
    }

    #[test]
    fn unassigned_task_exports_an_empty_cell() {
        let mut store = EntityStore::new();
        let schedule = Schedule::new(
            NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
        );
        let p = store.add_project(ProjectDraft::new("Event", schedule.clone())).unwrap();
        store
            .add_task(p, TaskDraft::new("Flyers").with_schedule(schedule))
            .unwrap();

        let rows = collect_gantt_tasks(&store, "未割当");
        assert_eq!(rows[0].assignee, "未割当");
        let mut out = Vec::new();
        write_csv(&store, &rows, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().nth(1),
            Some("Flyers;Event;;2024-04-01;2024-04-02;not-started")
        );
    }
}
