pub mod logs;
pub mod lookups;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Logs
        .route("/api/v1/logs", get(logs::list))
        .route("/api/v1/logs/export", get(logs::export))
        .route("/api/v1/logs/actions", get(lookups::actions))
        .route("/api/v1/logs/stats", get(lookups::stats))
        // Lookups
        .route("/api/v1/users", get(lookups::users))
        .route("/api/v1/posts/{id}/title", get(lookups::post_title))
}
