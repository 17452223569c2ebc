use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct LogStats {
    pub total_logs: i64,
    pub unique_users: i64,
    pub today_logs: i64,
    pub error_actions: i64,
}
