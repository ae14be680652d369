pub mod exercise;
pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notifications                 inbox listing (auth required)
/// /notifications/unread-count    unread counter
/// /notifications/{id}/read       mark read
/// /notifications/{id}/clicked    mark clicked
///
/// /exercises/{id}/activate       release + schedule notifications
/// /exercises/{id}/start          participant opens the exercise
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/notifications", notification::router())
        .nest("/exercises", exercise::router())
}
