use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of `user_logs` with the author's profile name joined in.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub user_action: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub authenticated_id: Option<Uuid>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub user_name: Option<String>,
}
