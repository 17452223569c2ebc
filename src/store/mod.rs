//! The data-access capability the dashboard is built on.
//!
//! Components receive a [`SharedStore`] explicitly instead of reaching for a
//! global client, which lets the tests swap in [`MemoryLogStore`].

mod memory;
mod pg;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{LogRecord, LogStats, UserProfile};
use crate::query::{LogQuery, Predicate};

pub use memory::MemoryLogStore;
pub use pg::PgLogStore;

pub type SharedStore = Arc<dyn LogStore>;

#[async_trait]
pub trait LogStore: Send + Sync {
    /// Number of records matching every predicate.
    async fn count(&self, predicates: &[Predicate]) -> Result<i64, AppError>;

    /// Matching records, newest first, restricted to the query's window if
    /// it has one. Each record carries its author's profile name.
    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRecord>, AppError>;

    async fn list_distinct_actions(&self) -> Result<Vec<String>, AppError>;

    /// Profiles ordered by name.
    async fn list_user_profiles(&self) -> Result<Vec<UserProfile>, AppError>;

    /// Title of a `post_content` row, if it exists.
    async fn get_post_title(&self, post_id: &str) -> Result<Option<String>, AppError>;

    /// Dashboard counters; `today_logs` counts records at or after `since`.
    async fn stats(&self, since: DateTime<Utc>) -> Result<LogStats, AppError>;
}
