use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::{LogRecord, LogStats};
use crate::query::{LogQuery, Predicate, SortOrder};

const SELECT_LOGS: &str = "SELECT l.id, l.user_action, l.user_agent, l.ip_address,
        l.authenticated_id, l.metadata, l.created_at, p.name AS user_name
     FROM user_logs l
     LEFT JOIN user_profiles p ON p.id = l.authenticated_id";

pub async fn count(pool: &PgPool, predicates: &[Predicate]) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM user_logs l");
    push_predicates(&mut qb, predicates);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn list(pool: &PgPool, query: &LogQuery) -> Result<Vec<LogRecord>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(SELECT_LOGS);
    push_predicates(&mut qb, &query.predicates);

    match query.order {
        SortOrder::NewestFirst => qb.push(" ORDER BY l.created_at DESC, l.id DESC"),
    };

    if let Some(window) = query.window {
        qb.push(" LIMIT ")
            .push_bind(window.limit)
            .push(" OFFSET ")
            .push_bind(window.offset);
    }

    qb.build_query_as::<LogRecord>().fetch_all(pool).await
}

pub async fn distinct_actions(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT user_action FROM user_logs ORDER BY user_action",
    )
    .fetch_all(pool)
    .await
}

pub async fn stats(pool: &PgPool, since: DateTime<Utc>) -> Result<LogStats, sqlx::Error> {
    sqlx::query_as::<_, LogStats>(
        "SELECT COUNT(*) AS total_logs,
                COUNT(DISTINCT authenticated_id) AS unique_users,
                COUNT(*) FILTER (WHERE created_at >= $1) AS today_logs,
                COUNT(*) FILTER (WHERE user_action ILIKE '%error%') AS error_actions
         FROM user_logs",
    )
    .bind(since)
    .fetch_one(pool)
    .await
}

/// Appends a `WHERE` clause for `predicates`; nothing when the list is empty.
/// Expects the log table to be aliased `l`.
pub fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Search(term) => {
                let pattern = format!("%{}%", escape_like(term));
                qb.push("(l.user_action ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR l.metadata::text ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            Predicate::CreatedFrom(start) => {
                qb.push("l.created_at >= ").push_bind(*start);
            }
            Predicate::CreatedTo(end) => {
                qb.push("l.created_at <= ").push_bind(*end);
            }
            Predicate::ActionIs(action) => {
                qb.push("l.user_action = ").push_bind(action.clone());
            }
            Predicate::UserIs(id) => {
                qb.push("l.authenticated_id = ").push_bind(*id);
            }
        }
    }
}

/// Search terms are literal text; `%`, `_` and the escape character itself
/// must not act as wildcards.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
