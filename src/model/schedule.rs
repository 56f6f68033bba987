use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::EntityKind;
use crate::error::ValidationError;

const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Optional start/end dates with optional wall-clock times.
///
/// Shared by projects, tasks, sub-projects and sub-project tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_date: Option<NaiveDate>,
    pub end_time: Option<NaiveTime>,
}

impl Schedule {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        }
    }

    pub fn with_times(mut self, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self
    }

    /// Both dates, when both are present.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Fill in missing times without touching ones the user entered.
    pub fn or_times(mut self, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        self.start_time.get_or_insert(start_time);
        self.end_time.get_or_insert(end_time);
        self
    }

    /// Reject an end date earlier than the start date. Missing dates pass.
    pub fn check_order(&self, entity: EntityKind) -> Result<(), ValidationError> {
        check_date_order(entity, self.start_date, self.end_date)
    }

    /// Require both dates and a valid order.
    pub fn check_required(&self, entity: EntityKind) -> Result<(), ValidationError> {
        if self.date_range().is_none() {
            return Err(ValidationError::MissingDateRange { entity });
        }
        self.check_order(entity)
    }

    /// `"2024-04-01 09:00 ～ 2024-04-07 18:00（7日間）"`, or an empty string
    /// when either date is missing. Missing times count as midnight.
    pub fn describe(&self) -> String {
        let Some((start_date, end_date)) = self.date_range() else {
            return String::new();
        };
        let start_time = self.start_time.unwrap_or(NaiveTime::MIN);
        let end_time = self.end_time.unwrap_or(NaiveTime::MIN);
        let start = NaiveDateTime::new(start_date, start_time);
        let end = NaiveDateTime::new(end_date, end_time);

        let seconds = (end - start).num_seconds() as f64;
        let days = (seconds / SECONDS_PER_DAY).ceil() as i64;
        // half rounds up, so -0.5 hours reads as 0
        let hours = (seconds / SECONDS_PER_HOUR + 0.5).floor() as i64;

        let span = if days > 1 {
            format!("{days}日間")
        } else {
            format!("{hours}時間")
        };
        format!(
            "{} {} ～ {} {}（{}）",
            start_date.format("%Y-%m-%d"),
            start_time.format("%H:%M"),
            end_date.format("%Y-%m-%d"),
            end_time.format("%H:%M"),
            span
        )
    }

    /// Date-only variant of [`Schedule::describe`]: `"2024-04-01 ～ 2024-06-30（90日間）"`.
    pub fn describe_dates(&self) -> String {
        describe_date_span(self.start_date, self.end_date)
    }
}

pub(crate) fn check_date_order(
    entity: EntityKind,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(ValidationError::EndBeforeStart { entity, start, end })
        }
        _ => Ok(()),
    }
}

pub(crate) fn describe_date_span(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let days = (end - start).num_days();
    format!(
        "{} ～ {}（{}日間）",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
        days
    )
}
