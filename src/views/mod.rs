pub mod logs;

use axum::response::Redirect;
use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/logs") }))
        .route("/logs", get(logs::index))
        // HTMX partials
        .route("/htmx/logs", get(logs::table_partial))
        .route("/htmx/posts/{id}/title", get(logs::post_title_partial))
}
