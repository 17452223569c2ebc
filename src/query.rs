//! Backend-agnostic description of a log query.
//!
//! [`build_predicates`] is the only place filter state turns into
//! predicates. The count, page and export queries all start from its output
//! and differ only in whether a [`RowWindow`] is attached, so the three can
//! never disagree about which records match.

use std::io;

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use uuid::Uuid;

use crate::filter::LogFilters;
use crate::models::LogRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `user_action` or the `jsonb::text` rendering of `metadata` contains
    /// the term, ignoring case.
    Search(String),
    /// `created_at >= t`
    CreatedFrom(DateTime<Utc>),
    /// `created_at <= t`
    CreatedTo(DateTime<Utc>),
    /// `user_action == action`
    ActionIs(String),
    /// `authenticated_id == id`
    UserIs(Uuid),
}

impl Predicate {
    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Predicate::Search(term) => {
                let needle = term.to_lowercase();
                record.user_action.to_lowercase().contains(&needle)
                    || jsonb_text(&record.metadata).to_lowercase().contains(&needle)
            }
            Predicate::CreatedFrom(start) => record.created_at >= *start,
            Predicate::CreatedTo(end) => record.created_at <= *end,
            Predicate::ActionIs(action) => record.user_action == *action,
            Predicate::UserIs(id) => record.authenticated_id == Some(*id),
        }
    }
}

/// Predicates for the given filters, ANDed together. An empty list matches
/// every record.
pub fn build_predicates(filters: &LogFilters) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if !filters.search.is_empty() {
        predicates.push(Predicate::Search(filters.search.clone()));
    }
    if let Some(start) = filters.date_range.start {
        predicates.push(Predicate::CreatedFrom(start));
    }
    if let Some(end) = filters.date_range.end {
        predicates.push(Predicate::CreatedTo(end));
    }
    if !filters.action.is_empty() {
        predicates.push(Predicate::ActionIs(filters.action.clone()));
    }
    if let Some(user_id) = filters.user_id {
        predicates.push(Predicate::UserIs(user_id));
    }

    predicates
}

pub fn matches_all(predicates: &[Predicate], record: &LogRecord) -> bool {
    predicates.iter().all(|p| p.matches(record))
}

/// Records are always listed newest first. `id` breaks ties so that page
/// boundaries are stable between requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    NewestFirst,
}

/// A contiguous slice of the ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub offset: i64,
    pub limit: i64,
}

impl RowWindow {
    /// Rows `(page - 1) * page_size ..= page * page_size - 1`.
    pub fn for_page(page: i64, page_size: i64) -> Self {
        let page = page.max(1);
        Self {
            offset: (page - 1) * page_size,
            limit: page_size,
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub predicates: Vec<Predicate>,
    pub order: SortOrder,
    pub window: Option<RowWindow>,
}

impl LogQuery {
    /// Every record matching `predicates`, unwindowed.
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self {
            predicates,
            order: SortOrder::NewestFirst,
            window: None,
        }
    }

    pub fn with_window(mut self, window: RowWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn page(filters: &LogFilters, page: i64, page_size: i64) -> Self {
        Self::new(build_predicates(filters)).with_window(RowWindow::for_page(page, page_size))
    }

    pub fn export(filters: &LogFilters) -> Self {
        Self::new(build_predicates(filters))
    }
}

/// `value` as Postgres prints a `jsonb` column cast to text: `", "` and
/// `": "` separators, object keys ordered by length and then bytewise.
pub fn jsonb_text(value: &Value) -> String {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, JsonbFormatter);
    match JsonbOrder(value).serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

struct JsonbFormatter;

impl serde_json::ser::Formatter for JsonbFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

struct JsonbOrder<'a>(&'a Value);

impl Serialize for JsonbOrder<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
                let mut out = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    out.serialize_entry(key, &JsonbOrder(value))?;
                }
                out.end()
            }
            Value::Array(items) => serializer.collect_seq(items.iter().map(JsonbOrder)),
            other => other.serialize(serializer),
        }
    }
}
