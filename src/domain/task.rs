//! Task domain model.
//!
//! This module contains the core entity of the application together with
//! its value objects: numeric identifiers, the status enumeration and the
//! zero-padded calendar due date.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a task.
///
/// Identifiers are plain integers chosen at creation time, either by the
/// client or by [`TaskIdGenerator`]. They never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i64);

impl TaskId {
    /// Creates a `TaskId` from a raw integer.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw integer value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Parses an identifier from a path segment.
    ///
    /// Returns `None` when the text is not an integer, which callers treat
    /// the same as an unknown identifier.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.trim().parse::<i64>().ok().map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Process-wide source of server-assigned task identifiers.
///
/// Produces `max(now_millis, last + 1)`, so identifiers stay close to the
/// creation time while never repeating within one process, even when many
/// tasks are created in the same millisecond.
#[derive(Debug, Default)]
pub struct TaskIdGenerator {
    last: AtomicI64,
}

impl TaskIdGenerator {
    /// Creates a generator with no identifiers issued yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Issues the next identifier based on the system clock.
    ///
    /// **Note**: This is an impure function (side effect: system clock).
    pub fn next_id(&self) -> TaskId {
        self.next_id_at(Utc::now().timestamp_millis())
    }

    /// Issues the next identifier as if the clock read `now_millis`.
    pub fn next_id_at(&self, now_millis: i64) -> TaskId {
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return TaskId(candidate),
                Err(observed) => current = observed,
            }
        }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The status of a task.
///
/// The wire spelling is kebab-case: `pending`, `in-progress`, `completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Task has not been started yet.
    #[default]
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task has been completed.
    Completed,
}

impl TaskStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    /// Returns true for [`TaskStatus::Completed`].
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown task status: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in-progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Due Date
// =============================================================================

/// Errors produced when parsing a [`DueDate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DueDateError {
    /// The text is not shaped like `YYYY-MM-DD`.
    #[error("Date must use the YYYY-MM-DD format: '{0}'")]
    Format(String),

    /// The text is well-shaped but names a day that does not exist.
    #[error("Date is not a valid calendar day: '{0}'")]
    Calendar(String),
}

/// A calendar due date stored as a zero-padded `YYYY-MM-DD` string.
///
/// Because every value has the same width and field order, the derived
/// string ordering is the chronological ordering. Range predicates in the
/// stores compare these strings directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DueDate(String);

impl DueDate {
    /// Parses and validates a due date.
    ///
    /// # Errors
    ///
    /// Returns [`DueDateError::Format`] when the text is not exactly ten
    /// characters of the form `DDDD-DD-DD`, and [`DueDateError::Calendar`]
    /// when it does not name a real day (for example `2024-02-30`).
    pub fn parse(text: &str) -> Result<Self, DueDateError> {
        let bytes = text.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes.iter().enumerate().all(|(index, byte)| match index {
                4 | 7 => *byte == b'-',
                _ => byte.is_ascii_digit(),
            });
        if !well_formed {
            return Err(DueDateError::Format(text.to_string()));
        }

        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(|_| Self(text.to_string()))
            .map_err(|_| DueDateError::Calendar(text.to_string()))
    }

    /// Creates a due date from a calendar date.
    ///
    /// Returns `None` for years outside `0..=9999`, which cannot be written
    /// with four digits.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        Self::parse(&date.format("%Y-%m-%d").to_string()).ok()
    }

    /// Returns the date as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the calendar date.
    #[must_use]
    pub fn to_date(&self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").unwrap_or_default()
    }

    /// Returns the date `days` later, if representable.
    #[must_use]
    pub fn plus_days(&self, days: u64) -> Option<Self> {
        self.to_date()
            .checked_add_days(Days::new(days))
            .and_then(Self::from_date)
    }

    /// Returns true when the date lies strictly before `today`.
    #[must_use]
    pub fn is_overdue(&self, today: &Self) -> bool {
        self < today
    }

    /// Returns true when the date equals `today`.
    #[must_use]
    pub fn is_today(&self, today: &Self) -> bool {
        self == today
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl TryFrom<String> for DueDate {
    type Error = DueDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DueDate> for String {
    fn from(value: DueDate) -> Self {
        value.0
    }
}

impl FromStr for DueDate {
    type Err = DueDateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

// =============================================================================
// Task Entity
// =============================================================================

/// A task tracked by the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional free-form description; never blank when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Optional calendar due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DueDate>,
}

impl Task {
    /// Creates a pending task with the given title and no optional fields.
    #[must_use]
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
        }
    }

    /// Returns the task with its description replaced.
    ///
    /// The description is trimmed; a blank description becomes `None`.
    #[must_use]
    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.description = normalize_description(description);
        self
    }

    /// Returns the task with its status replaced.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the task with its due date replaced.
    #[must_use]
    pub fn with_due_date(mut self, due_date: Option<DueDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Returns true when the task is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

/// Trims a description, mapping blank input to `None`.
#[must_use]
pub fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToString::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // -------------------------------------------------------------------------
    // TaskId Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("42", Some(42))]
    #[case(" 7 ", Some(7))]
    #[case("-3", Some(-3))]
    #[case("abc", None)]
    #[case("", None)]
    #[case("1.5", None)]
    fn test_task_id_parse(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(TaskId::parse(input).map(TaskId::value), expected);
    }

    #[rstest]
    fn test_generator_follows_clock() {
        let generator = TaskIdGenerator::new();
        assert_eq!(generator.next_id_at(1_000).value(), 1_000);
        assert_eq!(generator.next_id_at(2_000).value(), 2_000);
    }

    #[rstest]
    fn test_generator_never_repeats_within_same_millisecond() {
        let generator = TaskIdGenerator::new();
        let first = generator.next_id_at(5_000);
        let second = generator.next_id_at(5_000);
        let third = generator.next_id_at(4_000);
        assert_eq!(first.value(), 5_000);
        assert_eq!(second.value(), 5_001);
        assert_eq!(third.value(), 5_002);
    }

    // -------------------------------------------------------------------------
    // TaskStatus Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("pending", TaskStatus::Pending)]
    #[case("in-progress", TaskStatus::InProgress)]
    #[case("completed", TaskStatus::Completed)]
    fn test_status_round_trips_through_text(#[case] text: &str, #[case] status: TaskStatus) {
        assert_eq!(text.parse::<TaskStatus>().unwrap(), status);
        assert_eq!(status.as_str(), text);
    }

    #[rstest]
    #[case("in_progress")]
    #[case("Completed")]
    #[case("active")]
    fn test_status_rejects_unknown(#[case] text: &str) {
        assert_eq!(
            text.parse::<TaskStatus>(),
            Err(UnknownStatus(text.to_string()))
        );
    }

    #[rstest]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    // -------------------------------------------------------------------------
    // DueDate Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("2024-01-05")]
    #[case("2024-02-29")]
    #[case("0999-12-31")]
    fn test_due_date_accepts_valid(#[case] text: &str) {
        assert_eq!(DueDate::parse(text).unwrap().as_str(), text);
    }

    #[rstest]
    #[case("2024-1-5")]
    #[case("2024/01/05")]
    #[case("24-01-05")]
    #[case("2024-01-05T00:00")]
    #[case("")]
    fn test_due_date_rejects_bad_format(#[case] text: &str) {
        assert!(matches!(DueDate::parse(text), Err(DueDateError::Format(_))));
    }

    #[rstest]
    #[case("2023-02-29")]
    #[case("2024-13-01")]
    #[case("2024-04-31")]
    fn test_due_date_rejects_impossible_day(#[case] text: &str) {
        assert!(matches!(
            DueDate::parse(text),
            Err(DueDateError::Calendar(_))
        ));
    }

    #[rstest]
    fn test_due_date_string_order_is_date_order() {
        let earlier = DueDate::parse("2024-09-30").unwrap();
        let later = DueDate::parse("2024-10-01").unwrap();
        assert!(earlier < later);
        assert!(earlier.to_date() < later.to_date());
    }

    #[rstest]
    fn test_due_date_plus_days_crosses_month() {
        let date = DueDate::parse("2024-02-26").unwrap();
        assert_eq!(date.plus_days(6).unwrap().as_str(), "2024-03-03");
    }

    #[rstest]
    fn test_due_date_overdue_and_today() {
        let today = DueDate::parse("2024-05-10").unwrap();
        let yesterday = DueDate::parse("2024-05-09").unwrap();
        assert!(yesterday.is_overdue(&today));
        assert!(!today.is_overdue(&today));
        assert!(today.is_today(&today));
        assert!(!yesterday.is_today(&today));
    }

    #[rstest]
    fn test_due_date_deserialize_validates() {
        let result: Result<DueDate, _> = serde_json::from_str("\"2024-02-30\"");
        assert!(result.is_err());
    }

    // -------------------------------------------------------------------------
    // Task Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case(Some("  notes  "), Some("notes"))]
    #[case(Some("   "), None)]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn test_with_description_normalizes(
        #[case] input: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let task = Task::new(TaskId::new(1), "Title").with_description(input);
        assert_eq!(task.description.as_deref(), expected);
    }

    #[rstest]
    fn test_task_new_defaults_to_pending() {
        let task = Task::new(TaskId::new(1), "Title");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.due_date.is_none());
        assert!(!task.is_completed());
    }

    #[rstest]
    fn test_task_serializes_camel_case_without_absent_fields() {
        let task = Task::new(TaskId::new(9), "Ship")
            .with_status(TaskStatus::InProgress)
            .with_due_date(Some(DueDate::parse("2024-06-01").unwrap()));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 9,
                "title": "Ship",
                "status": "in-progress",
                "dueDate": "2024-06-01"
            })
        );
    }
}
