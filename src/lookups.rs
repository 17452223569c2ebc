//! Reference data for the filter form and row details.
//!
//! These lookups never fail outward: a store error is logged and the caller
//! gets an empty result, so a broken dropdown never takes the page down.

use chrono::{DateTime, NaiveTime, Utc};

use crate::models::{LogStats, UserProfile};
use crate::store::LogStore;

pub async fn action_options(store: &dyn LogStore) -> Vec<String> {
    store.list_distinct_actions().await.unwrap_or_else(|e| {
        tracing::error!("Error loading actions: {e}");
        Vec::new()
    })
}

pub async fn user_options(store: &dyn LogStore) -> Vec<UserProfile> {
    store.list_user_profiles().await.unwrap_or_else(|e| {
        tracing::error!("Error loading user profiles: {e}");
        Vec::new()
    })
}

pub async fn post_title(store: &dyn LogStore, post_id: &str) -> Option<String> {
    store.get_post_title(post_id).await.unwrap_or_else(|e| {
        tracing::error!("Error fetching post {post_id}: {e}");
        None
    })
}

/// Counters for the stats panel; "today" starts at midnight UTC of `now`.
pub async fn stats(store: &dyn LogStore, now: DateTime<Utc>) -> LogStats {
    store.stats(start_of_day(now)).await.unwrap_or_else(|e| {
        tracing::error!("Error fetching stats: {e}");
        LogStats::default()
    })
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::store::MemoryLogStore;

    #[tokio::test]
    async fn failures_degrade_to_empty() {
        let store = MemoryLogStore::new();
        store.insert_post("p1", "Hello").await;
        store.set_failing(true);

        assert!(action_options(&store).await.is_empty());
        assert!(user_options(&store).await.is_empty());
        assert_eq!(post_title(&store, "p1").await, None);
        assert_eq!(stats(&store, Utc::now()).await, LogStats::default());

        store.set_failing(false);
        assert_eq!(post_title(&store, "p1").await.as_deref(), Some("Hello"));
        assert_eq!(post_title(&store, "missing").await, None);
    }

    #[test]
    fn day_starts_at_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 17, 45, 3).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap()
        );
    }
}
