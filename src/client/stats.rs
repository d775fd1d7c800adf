//! Global statistics as displayed by the client.
//!
//! The typed [`GlobalStatsResponse`] is the primary path. Older servers
//! spelled the in-progress bucket differently, so raw JSON that does not fit
//! the typed schema goes through [`StatsView::from_raw`], which reads that
//! bucket through a synonym table.

use serde_json::Value;

use crate::api::GlobalStatsResponse;
use crate::domain::completion_percent;

/// Spellings of the in-progress bucket, in lookup order.
pub const IN_PROGRESS_KEYS: [&str; 3] = ["inProgress", "in-progress", "in_progress"];

/// Figures shown in the statistics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsView {
    /// All tasks.
    pub total: u64,
    /// Completed tasks.
    pub completed: u64,
    /// Pending tasks.
    pub pending: u64,
    /// In-progress tasks.
    pub in_progress: u64,
    /// Rounded completion percentage.
    pub percent: u64,
}

impl StatsView {
    /// Displayed "not done" figure: pending plus in-progress.
    #[must_use]
    pub const fn not_done(&self) -> u64 {
        self.pending + self.in_progress
    }

    /// Decodes a statistics body, preferring the typed schema.
    #[must_use]
    pub fn from_json(body: &Value) -> Self {
        serde_json::from_value::<GlobalStatsResponse>(body.clone())
            .map_or_else(|_| Self::from_raw(body), Self::from)
    }

    /// Reads a statistics body tolerantly.
    ///
    /// Each status count is read from `byStatus`, then from the top level of
    /// the body; the first nonzero value wins. Numeric strings count as
    /// numbers and anything else as 0. A missing `total` is the sum of the
    /// counts and a missing `percent` is recomputed from them.
    #[must_use]
    pub fn from_raw(body: &Value) -> Self {
        let by_status = &body["byStatus"];
        let completed = status_count(body, "completed");
        let pending = status_count(body, "pending");
        let in_progress = lookup_in_progress(by_status);
        let total = body
            .get("total")
            .and_then(coerce)
            .unwrap_or(completed + pending + in_progress);
        let percent = body
            .get("percent")
            .and_then(coerce)
            .unwrap_or_else(|| completion_percent(completed, total));

        Self {
            total,
            completed,
            pending,
            in_progress,
            percent,
        }
    }
}

impl From<GlobalStatsResponse> for StatsView {
    fn from(response: GlobalStatsResponse) -> Self {
        Self {
            total: response.total,
            completed: response.by_status.completed,
            pending: response.by_status.pending,
            in_progress: response.by_status.in_progress,
            percent: response.percent,
        }
    }
}

/// Returns the first present in-progress spelling, or 0.
#[must_use]
pub fn lookup_in_progress(by_status: &Value) -> u64 {
    IN_PROGRESS_KEYS
        .iter()
        .find_map(|key| by_status.get(key))
        .map_or(0, number)
}

fn status_count(body: &Value, key: &str) -> u64 {
    [&body["byStatus"][key], &body[key]]
        .into_iter()
        .map(number)
        .find(|count| *count != 0)
        .unwrap_or(0)
}

fn number(value: &Value) -> u64 {
    coerce(value).unwrap_or(0)
}

/// Reads a non-negative integer from a JSON number or numeric string.
fn coerce(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({ "inProgress": 4 }), 4)]
    #[case(json!({ "in-progress": 3 }), 3)]
    #[case(json!({ "in_progress": 2 }), 2)]
    #[case(json!({ "in-progress": 3, "inProgress": 4 }), 4)]
    #[case(json!({ "in_progress": 2, "in-progress": 3 }), 3)]
    #[case(json!({ "pending": 1 }), 0)]
    #[case(json!(null), 0)]
    fn test_lookup_in_progress(#[case] by_status: Value, #[case] expected: u64) {
        assert_eq!(lookup_in_progress(&by_status), expected);
    }

    #[rstest]
    fn test_typed_body_is_primary() {
        let body = json!({
            "total": 10,
            "byStatus": { "completed": 5, "inProgress": 3, "pending": 2 },
            "percent": 50,
            "summary": { "done": 5, "notDone": 5 }
        });
        let view = StatsView::from_json(&body);
        assert_eq!(view.in_progress, 3);
        assert_eq!(view.not_done(), 5);
        assert_eq!(view.percent, 50);
    }

    #[rstest]
    fn test_legacy_body_uses_synonyms() {
        let body = json!({
            "total": 6,
            "byStatus": { "completed": 2, "in_progress": 1, "pending": 3 }
        });
        let view = StatsView::from_json(&body);
        assert_eq!(view.in_progress, 1);
        assert_eq!(view.not_done(), 4);
        assert_eq!(view.percent, 33);
    }

    #[rstest]
    fn test_top_level_counts_without_by_status() {
        let view = StatsView::from_json(&json!({ "total": 5, "completed": 2, "pending": 3 }));
        assert_eq!(view.total, 5);
        assert_eq!(view.completed, 2);
        assert_eq!(view.pending, 3);
        assert_eq!(view.percent, 40);
    }

    #[rstest]
    fn test_zero_in_by_status_falls_through_to_top_level() {
        let view = StatsView::from_raw(&json!({
            "total": 4,
            "byStatus": { "completed": 0 },
            "completed": 1
        }));
        assert_eq!(view.completed, 1);
    }

    #[rstest]
    fn test_numeric_strings_are_counted() {
        let view = StatsView::from_json(&json!({
            "total": "5",
            "byStatus": { "completed": "2", "pending": "3", "in-progress": " 1 " },
            "percent": "40"
        }));
        assert_eq!(view.total, 5);
        assert_eq!(view.completed, 2);
        assert_eq!(view.pending, 3);
        assert_eq!(view.in_progress, 1);
        assert_eq!(view.percent, 40);
    }

    #[rstest]
    #[case(json!("abc"), 0)]
    #[case(json!(-3), 0)]
    #[case(json!(true), 0)]
    #[case(json!("7"), 7)]
    fn test_number_coercion(#[case] value: Value, #[case] expected: u64) {
        assert_eq!(number(&value), expected);
    }

    #[rstest]
    fn test_empty_body_is_all_zero() {
        assert_eq!(StatsView::from_json(&json!({})), StatsView::default());
    }
}
