use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::state::SharedState;

/// Sends browsers that hit a view without a valid session to the identity
/// provider's login page.
pub async fn redirect_unauthorized(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if response.status() == StatusCode::UNAUTHORIZED {
        Redirect::to(&state.config.login_url).into_response()
    } else {
        response
    }
}
