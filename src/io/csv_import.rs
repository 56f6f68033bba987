use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::CsvError;
use crate::model::{Schedule, TaskDraft, TaskStatus};

/// Rows parsed from a CSV file, ready to be created through the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportedTasks {
    pub tasks: Vec<(TaskDraft, TaskStatus)>,
    /// Rows dropped for a missing name or unreadable date.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Start,
    End,
    Status,
    Description,
    Assignee,
}

/// Map a free-form status string to a task status. Unknown values are not started.
fn parse_status(status: &str) -> TaskStatus {
    match status.trim().to_lowercase().as_str() {
        "finished" | "done" | "complete" | "completed" | "完了" => TaskStatus::Completed,
        "in progress" | "in-progress" | "active" | "started" | "進行中" => TaskStatus::InProgress,
        _ => TaskStatus::NotStarted,
    }
}

/// Try parsing a date string with several common formats.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Pick the separator that occurs most often in the header line.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

fn header_to_column(normalized: &str) -> Option<Column> {
    match normalized {
        "name" | "task" | "tasklabel" | "taskname" | "label" | "title" | "activity" => {
            Some(Column::Name)
        }
        "start" | "startdate" | "from" | "begin" | "begindate" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "finishdate" | "due" | "duedate" => Some(Column::End),
        "status" | "state" | "stage" => Some(Column::Status),
        "description" | "notes" | "note" | "details" | "comment" | "comments" => {
            Some(Column::Description)
        }
        "assignee" | "owner" | "assignedto" | "responsible" => Some(Column::Assignee),
        _ => None,
    }
}

/// Parse task rows from CSV text.
///
/// The delimiter is auto-detected (semicolon, comma, tab) and headers are
/// matched flexibly ("Task Label", "Start Date", ...). Name, start and end
/// columns are required.
pub fn read_csv(content: &str) -> Result<ImportedTasks, CsvError> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let columns: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_column(&normalize_header(h)))
        .collect();

    let has = |wanted: Column| columns.iter().any(|c| *c == Some(wanted));
    if !has(Column::Name) || !has(Column::Start) || !has(Column::End) {
        return Err(CsvError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut imported = ImportedTasks::default();

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "skipping unreadable CSV row");
                imported.skipped += 1;
                continue;
            }
        };

        let mut name = None;
        let mut start = None;
        let mut end = None;
        let mut status = None;
        let mut description = None;
        let mut assignee = None;

        for (field, column) in record.iter().zip(&columns) {
            let value = Some(field.trim());
            match column {
                Some(Column::Name) => name = value,
                Some(Column::Start) => start = value,
                Some(Column::End) => end = value,
                Some(Column::Status) => status = value,
                Some(Column::Description) => description = value,
                Some(Column::Assignee) => assignee = value,
                None => {}
            }
        }

        let Some(name) = name.filter(|n| !n.is_empty()) else {
            debug!(row, "skipping CSV row without a task name");
            imported.skipped += 1;
            continue;
        };
        let (Some(start), Some(end)) = (start.and_then(parse_date), end.and_then(parse_date)) else {
            warn!(row, name, "skipping CSV row with an invalid date");
            imported.skipped += 1;
            continue;
        };

        let draft = TaskDraft {
            description: description.unwrap_or_default().to_string(),
            assignee: assignee.filter(|a| !a.is_empty()).map(str::to_string),
            ..TaskDraft::new(name).with_schedule(Schedule::new(start, end))
        };
        imported
            .tasks
            .push((draft, status.map(parse_status).unwrap_or_default()));
    }

    if imported.tasks.is_empty() {
        return Err(CsvError::Empty {
            skipped: imported.skipped,
        });
    }
    Ok(imported)
}

/// Read and parse a CSV file. See [`read_csv`].
pub fn import_csv(path: &Path) -> Result<ImportedTasks, CsvError> {
    let content = std::fs::read_to_string(path)?;
    read_csv(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn detects_delimiters() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
    }

    #[test]
    fn parses_common_date_formats() {
        assert_eq!(parse_date("2024-04-01"), Some(d(2024, 4, 1)));
        assert_eq!(parse_date("2024/04/01"), Some(d(2024, 4, 1)));
        assert_eq!(parse_date("15/04/2024"), Some(d(2024, 4, 15)));
        assert_eq!(parse_date("15.04.2024"), Some(d(2024, 4, 15)));
        assert_eq!(parse_date("soon"), None);
    }

    #[test]
    fn flexible_headers_and_statuses() {
        let csv = "Task Label,Start Date,End Date,Status,Owner\n\
                   Venue,2024-04-01,2024-04-10,Done,Sato\n\
                   Catering,2024-04-05,2024-04-20,whatever,\n";
        let imported = read_csv(csv).unwrap();
        assert_eq!(imported.skipped, 0);
        assert_eq!(imported.tasks.len(), 2);

        let (venue, status) = &imported.tasks[0];
        assert_eq!(venue.title, "Venue");
        assert_eq!(venue.assignee.as_deref(), Some("Sato"));
        assert_eq!(venue.schedule.date_range(), Some((d(2024, 4, 1), d(2024, 4, 10))));
        assert_eq!(*status, TaskStatus::Completed);

        let (catering, status) = &imported.tasks[1];
        assert_eq!(catering.assignee, None);
        assert_eq!(*status, TaskStatus::NotStarted);
    }

    #[test]
    fn bad_rows_are_counted() {
        let csv = "name;start;end\n;2024-04-01;2024-04-02\nok;2024-04-01;2024-04-02\nbad;nope;2024-04-02\n";
        let imported = read_csv(csv).unwrap();
        assert_eq!(imported.tasks.len(), 1);
        assert_eq!(imported.skipped, 2);
    }

    #[test]
    fn missing_columns_are_rejected() {
        let err = read_csv("name;status\nx;done\n").unwrap_err();
        assert!(matches!(err, CsvError::MissingColumns { .. }));
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let err = read_csv("name;start;end\nx;?;?\n").unwrap_err();
        assert!(matches!(err, CsvError::Empty { skipped: 1 }));
    }
}
