use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::json;

use crate::auth::extractor::AdminUser;
use crate::lookups;
use crate::models::{LogStats, UserProfile};
use crate::state::SharedState;

pub async fn actions(_admin: AdminUser, State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(lookups::action_options(state.store.as_ref()).await)
}

pub async fn users(_admin: AdminUser, State(state): State<SharedState>) -> Json<Vec<UserProfile>> {
    Json(lookups::user_options(state.store.as_ref()).await)
}

pub async fn stats(_admin: AdminUser, State(state): State<SharedState>) -> Json<LogStats> {
    Json(lookups::stats(state.store.as_ref(), Utc::now()).await)
}

pub async fn post_title(
    _admin: AdminUser,
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    let title = lookups::post_title(state.store.as_ref(), &id).await;
    Json(json!({ "post_id": id, "title": title }))
}
