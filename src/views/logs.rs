use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::Utc;

use crate::auth::extractor::AdminUser;
use crate::error::AppError;
use crate::export::format_timestamp;
use crate::filter::LogFilterParams;
use crate::lookups;
use crate::models::{LogRecord, LogStats};
use crate::pagination::PaginationState;
use crate::routes::logs::PageParams;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "logs/index.html")]
#[allow(dead_code)]
struct LogsPageTemplate {
    user_name: String,
    stats: LogStats,
    search: String,
    start: String,
    end: String,
    actions: Vec<SelectOption>,
    users: Vec<SelectOption>,
}

#[allow(dead_code)]
struct SelectOption {
    value: String,
    label: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "logs/table.html")]
#[allow(dead_code)]
struct LogsTableTemplate {
    rows: Vec<LogRow>,
    total: i64,
    page: i64,
    total_pages: i64,
    has_prev: bool,
    has_next: bool,
    showing_from: i64,
    showing_to: i64,
}

#[allow(dead_code)]
struct LogRow {
    id: String,
    action: String,
    user: String,
    ip: String,
    user_agent: String,
    timestamp: String,
    metadata: String,
    /// Empty when the metadata does not reference a post.
    post_id: String,
}

impl From<LogRecord> for LogRow {
    fn from(log: LogRecord) -> Self {
        let post_id = log
            .metadata
            .get("post_id")
            .map(|v| match v {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();

        LogRow {
            id: log.id.to_string(),
            action: log.user_action,
            user: log.user_name.unwrap_or_else(|| "Unknown".to_string()),
            ip: log.ip_address.unwrap_or_else(|| "N/A".to_string()),
            user_agent: log.user_agent.unwrap_or_else(|| "N/A".to_string()),
            timestamp: format_timestamp(log.created_at),
            metadata: serde_json::to_string_pretty(&log.metadata).unwrap_or_default(),
            post_id,
        }
    }
}

pub async fn index(
    AdminUser(admin): AdminUser,
    State(state): State<SharedState>,
    Query(params): Query<LogFilterParams>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let (stats, action_names, profiles) = tokio::join!(
        lookups::stats(store, Utc::now()),
        lookups::action_options(store),
        lookups::user_options(store),
    );

    let selected_action = params.action.clone().unwrap_or_default();
    let selected_user = params.user_id.clone().unwrap_or_default();

    let actions = action_names
        .into_iter()
        .map(|name| SelectOption {
            selected: name == selected_action,
            label: name.clone(),
            value: name,
        })
        .collect();

    let users = profiles
        .into_iter()
        .map(|p| {
            let value = p.id.to_string();
            SelectOption {
                selected: value == selected_user,
                label: p.name,
                value,
            }
        })
        .collect();

    let template = LogsPageTemplate {
        user_name: admin.name,
        stats,
        search: params.search.unwrap_or_default(),
        start: params.start.unwrap_or_default(),
        end: params.end.unwrap_or_default(),
        actions,
        users,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

/// The table body and pagination footer. On a failed fetch this returns an
/// error status, which htmx does not swap in, so the previous table stays.
/// The rendered table carries the page it shows, which Refresh sends back.
pub async fn table_partial(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Query(filters): Query<LogFilterParams>,
    Query(paging): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let filters = filters.into_filters()?;
    let page = paging.page.unwrap_or(1).max(1);

    let fetched = state.fetcher.fetch(&filters, page).await?;

    let pagination = PaginationState {
        current_page: fetched.page,
        total_count: fetched.total,
        total_pages: fetched.total_pages,
        page_size: fetched.per_page,
    };
    let (showing_from, showing_to) = pagination.showing_range();

    let template = LogsTableTemplate {
        rows: fetched.logs.into_iter().map(LogRow::from).collect(),
        total: fetched.total,
        page: fetched.page,
        total_pages: fetched.total_pages,
        has_prev: pagination.has_prev(),
        has_next: pagination.has_next(),
        showing_from,
        showing_to,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

#[derive(Template)]
#[template(
    source = r#"{% if found %}<span class="post-title">{{ title }}</span>{% else %}<span class="post-title muted">Unknown post</span>{% endif %}"#,
    ext = "html"
)]
struct PostTitleTemplate {
    title: String,
    found: bool,
}

pub async fn post_title_partial(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let title = lookups::post_title(state.store.as_ref(), &id).await;
    let template = PostTitleTemplate {
        found: title.is_some(),
        title: title.unwrap_or_default(),
    };
    Html(template.render().unwrap_or_default())
}
