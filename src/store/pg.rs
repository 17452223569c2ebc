use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::{LogRecord, LogStats, UserProfile};
use crate::query::{LogQuery, Predicate};

use super::LogStore;

#[derive(Debug, Clone)]
pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for PgLogStore {
    async fn count(&self, predicates: &[Predicate]) -> Result<i64, AppError> {
        Ok(db::logs::count(&self.pool, predicates).await?)
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRecord>, AppError> {
        Ok(db::logs::list(&self.pool, query).await?)
    }

    async fn list_distinct_actions(&self) -> Result<Vec<String>, AppError> {
        Ok(db::logs::distinct_actions(&self.pool).await?)
    }

    async fn list_user_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        Ok(db::profiles::list_by_name(&self.pool).await?)
    }

    async fn get_post_title(&self, post_id: &str) -> Result<Option<String>, AppError> {
        Ok(db::posts::find_title(&self.pool, post_id).await?)
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<LogStats, AppError> {
        Ok(db::logs::stats(&self.pool, since).await?)
    }
}
