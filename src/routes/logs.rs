use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::extractor::AdminUser;
use crate::error::AppError;
use crate::export;
use crate::fetcher::FetchedPage;
use crate::filter::LogFilterParams;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
}

pub async fn list(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Query(filters): Query<LogFilterParams>,
    Query(paging): Query<PageParams>,
) -> Result<Json<FetchedPage>, AppError> {
    let filters = filters.into_filters()?;
    let page = paging.page.unwrap_or(1).max(1);

    let fetched = state.fetcher.fetch(&filters, page).await?;
    Ok(Json(fetched))
}

/// CSV download of every log matching the filters. The dashboard submits
/// its filter form here as a plain navigation, so failures answer
/// `204 No Content`: the browser stays on the page and no file is saved.
pub async fn export(
    AdminUser(admin): AdminUser,
    State(state): State<SharedState>,
    Query(filters): Query<LogFilterParams>,
) -> Response {
    let result = match filters.into_filters() {
        Ok(filters) => export::export_logs(state.store.as_ref(), &filters, Utc::now()).await,
        Err(e) => Err(e),
    };

    let export = match result {
        Ok(export) => export,
        Err(e) => {
            tracing::error!("Error exporting logs: {e}");
            return StatusCode::NO_CONTENT.into_response();
        }
    };

    tracing::info!(user_id = %admin.user_id, rows = export.rows, "Exported logs");

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    )
        .into_response()
}
