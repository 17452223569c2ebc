use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{LogRecord, LogStats, UserProfile};
use crate::query::{matches_all, LogQuery, Predicate, SortOrder};

use super::LogStore;

/// In-process store holding logs, profiles and post titles. Profile names
/// are joined onto records at read time, like the Postgres store does.
#[derive(Default)]
pub struct MemoryLogStore {
    logs: RwLock<Vec<LogRecord>>,
    profiles: RwLock<Vec<UserProfile>>,
    posts: RwLock<HashMap<String, String>>,
    fail_counts: AtomicBool,
    fail_queries: AtomicBool,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_log(&self, record: LogRecord) {
        self.logs.write().await.push(record);
    }

    pub async fn insert_profile(&self, profile: UserProfile) {
        self.profiles.write().await.push(profile);
    }

    pub async fn insert_post(&self, id: impl Into<String>, title: impl Into<String>) {
        self.posts.write().await.insert(id.into(), title.into());
    }

    /// Makes count requests fail until reset.
    pub fn set_fail_counts(&self, fail: bool) {
        self.fail_counts.store(fail, Ordering::SeqCst);
    }

    /// Makes every non-count request fail until reset.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn set_failing(&self, fail: bool) {
        self.set_fail_counts(fail);
        self.set_fail_queries(fail);
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), AppError> {
        if flag.load(Ordering::SeqCst) {
            Err(AppError::Internal("log store unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn count(&self, predicates: &[Predicate]) -> Result<i64, AppError> {
        self.check(&self.fail_counts)?;
        let logs = self.logs.read().await;
        Ok(logs.iter().filter(|r| matches_all(predicates, r)).count() as i64)
    }

    async fn query(&self, query: &LogQuery) -> Result<Vec<LogRecord>, AppError> {
        self.check(&self.fail_queries)?;
        let logs = self.logs.read().await;
        let profiles = self.profiles.read().await;

        let mut matching: Vec<&LogRecord> = logs
            .iter()
            .filter(|r| matches_all(&query.predicates, r))
            .collect();

        match query.order {
            SortOrder::NewestFirst => {
                matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)))
            }
        }

        let (skip, take) = match query.window {
            Some(w) => (w.offset.max(0) as usize, w.limit.max(0) as usize),
            None => (0, usize::MAX),
        };

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|r| {
                let mut record = r.clone();
                record.user_name = record.authenticated_id.and_then(|id| {
                    profiles.iter().find(|p| p.id == id).map(|p| p.name.clone())
                });
                record
            })
            .collect())
    }

    async fn list_distinct_actions(&self) -> Result<Vec<String>, AppError> {
        self.check(&self.fail_queries)?;
        let logs = self.logs.read().await;
        let actions: BTreeSet<&str> = logs.iter().map(|r| r.user_action.as_str()).collect();
        Ok(actions.into_iter().map(str::to_string).collect())
    }

    async fn list_user_profiles(&self) -> Result<Vec<UserProfile>, AppError> {
        self.check(&self.fail_queries)?;
        let mut profiles = self.profiles.read().await.clone();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn get_post_title(&self, post_id: &str) -> Result<Option<String>, AppError> {
        self.check(&self.fail_queries)?;
        Ok(self.posts.read().await.get(post_id).cloned())
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<LogStats, AppError> {
        self.check(&self.fail_queries)?;
        let logs = self.logs.read().await;
        let unique: HashSet<Uuid> = logs.iter().filter_map(|r| r.authenticated_id).collect();

        Ok(LogStats {
            total_logs: logs.len() as i64,
            unique_users: unique.len() as i64,
            today_logs: logs.iter().filter(|r| r.created_at >= since).count() as i64,
            error_actions: logs
                .iter()
                .filter(|r| r.user_action.to_lowercase().contains("error"))
                .count() as i64,
        })
    }
}
