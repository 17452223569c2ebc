//! Filter state for the log list.
//!
//! A [`LogFilters`] value is never mutated in place by the dashboard: every
//! edit produces a new value which replaces the old one wholesale and resets
//! pagination. Each field is independent and an empty field constrains
//! nothing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Inclusive bounds on `created_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFilters {
    /// Case-insensitive substring matched against the action name and the
    /// serialized metadata.
    pub search: String,
    pub date_range: DateRange,
    /// Exact action name; empty means any.
    pub action: String,
    pub user_id: Option<Uuid>,
}

impl LogFilters {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.date_range.start.is_none()
            && self.date_range.end.is_none()
            && self.action.is_empty()
            && self.user_id.is_none()
    }
}

/// Filter fields as they arrive in a query string. Empty strings are
/// treated as absent, matching what an untouched form field submits. The
/// search term and action are used verbatim; dates and the user id are
/// trimmed before parsing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogFilterParams {
    pub search: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub action: Option<String>,
    pub user_id: Option<String>,
}

impl LogFilterParams {
    pub fn into_filters(self) -> Result<LogFilters, AppError> {
        let start = non_empty(self.start)
            .map(|raw| parse_timestamp("start", &raw))
            .transpose()?;
        let end = non_empty(self.end)
            .map(|raw| parse_timestamp("end", &raw))
            .transpose()?;

        let user_id = non_empty(self.user_id)
            .map(|raw| {
                raw.parse::<Uuid>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid user_id: '{raw}'")))
            })
            .transpose()?;

        Ok(LogFilters {
            search: self.search.unwrap_or_default(),
            date_range: DateRange { start, end },
            action: self.action.unwrap_or_default(),
            user_id,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts RFC 3339, `datetime-local` input values and bare dates. Values
/// without an offset are taken as UTC; a bare date means its midnight.
fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(ts.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(AppError::BadRequest(format!(
        "Invalid {field} date: '{raw}'"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_params_give_empty_filters() {
        let params = LogFilterParams {
            search: Some(String::new()),
            start: Some("  ".to_string()),
            end: None,
            action: Some(String::new()),
            user_id: Some(String::new()),
        };
        let filters = params.into_filters().unwrap();
        assert!(filters.is_empty());
        assert_eq!(filters, LogFilters::default());
    }

    #[test]
    fn search_term_keeps_surrounding_spaces() {
        let params = LogFilterParams {
            search: Some(" error ".to_string()),
            start: Some(" 2024-03-01 ".to_string()),
            ..Default::default()
        };
        let filters = params.into_filters().unwrap();
        assert_eq!(filters.search, " error ");
        assert_eq!(
            filters.date_range.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn parses_each_date_format() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("start", "2024-03-01").unwrap(), expected);
        assert_eq!(parse_timestamp("start", "2024-03-01T00:00").unwrap(), expected);
        assert_eq!(
            parse_timestamp("start", "2024-03-01T02:00:00+02:00").unwrap(),
            expected
        );
    }

    #[test]
    fn rejects_bad_user_id() {
        let params = LogFilterParams {
            user_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(matches!(params.into_filters(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn rejects_bad_date() {
        let params = LogFilterParams {
            end: Some("yesterday".to_string()),
            ..Default::default()
        };
        let err = params.into_filters().unwrap_err();
        assert!(err.to_string().contains("end"));
    }
}
