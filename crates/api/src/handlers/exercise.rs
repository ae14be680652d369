//! Handlers for the `/exercises` resource.
//!
//! Only the two lifecycle triggers the notification engine cares about live
//! here: activation (which schedules the instance's notifications) and
//! start (which moves it into `in_progress`). Template authoring and
//! response capture belong to other services.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;

use cadence_core::error::CoreError;
use cadence_core::exercise::{validate_transition, STATUS_AVAILABLE, STATUS_IN_PROGRESS};
use cadence_core::types::DbId;
use cadence_db::models::exercise::UserExercise;
use cadence_db::repositories::UserExerciseRepo;
use cadence_notify::schedule_exercise_notifications;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/exercises/{id}/activate
///
/// Release an exercise instance to its participant and schedule its
/// notifications. Called by the study-coordination surface when an instance
/// reaches an active-eligible state.
pub async fn activate(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(exercise_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let exercise = UserExerciseRepo::get(&state.pool, exercise_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exercise",
            id: exercise_id,
        }))?;

    validate_transition(&exercise.status, STATUS_AVAILABLE)
        .map_err(|msg| AppError::Core(CoreError::Conflict(msg)))?;

    UserExerciseRepo::set_status(&state.pool, exercise_id, STATUS_AVAILABLE).await?;

    let scheduled = schedule_exercise_notifications(&state.pool, exercise_id).await?;

    Ok(Json(serde_json::json!({
        "data": { "scheduled": scheduled }
    })))
}

/// POST /api/v1/exercises/{id}/start
///
/// The participant opens the exercise: `available -> in_progress`, stamping
/// `started_at` on first start and refreshing `last_accessed_at`.
pub async fn start(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(exercise_id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserExercise>>> {
    let exercise = UserExerciseRepo::get(&state.pool, exercise_id)
        .await?
        .filter(|exercise| exercise.user_id == auth.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exercise",
            id: exercise_id,
        }))?;

    // Re-opening an in-progress exercise is fine; it just refreshes the
    // access stamp.
    if exercise.status != STATUS_IN_PROGRESS {
        validate_transition(&exercise.status, STATUS_IN_PROGRESS)
            .map_err(|msg| AppError::Core(CoreError::Conflict(msg)))?;
    }

    let now = Local::now().naive_local();
    UserExerciseRepo::mark_started(&state.pool, exercise_id, now).await?;

    let updated = UserExerciseRepo::get(&state.pool, exercise_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Exercise",
            id: exercise_id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}
