//! Route definitions for the `/exercises` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::exercise;
use crate::state::AppState;

/// Routes mounted at `/exercises`.
///
/// ```text
/// POST   /{id}/activate   -> activate (release + schedule notifications)
/// POST   /{id}/start      -> start (available -> in_progress)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/activate", post(exercise::activate))
        .route("/{id}/start", post(exercise::start))
}
