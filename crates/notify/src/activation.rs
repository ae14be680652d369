//! Exercise-activation scheduling.
//!
//! Called once when a user-exercise instance becomes active: runs the
//! schedule generator for each notification configuration on the instance's
//! template and persists the resulting records. Configuration gaps (missing
//! template, malformed config entries, absent morning time) are logged and
//! absorbed; only repository failures propagate.

use chrono::Local;

use cadence_core::schedule::{self, NotificationConfig, ScheduleContext, ScheduledPrompt};
use cadence_core::types::DbId;
use cadence_db::models::notification::CreateNotification;
use cadence_db::repositories::{ExerciseTemplateRepo, NotificationRepo, UserExerciseRepo, UserRepo};
use cadence_db::DbPool;

/// Generate and persist the notification schedule for one exercise instance.
///
/// Returns the number of records created. Both dates in the generation
/// context are "today": schedules fire on the day the exercise is activated.
pub async fn schedule_exercise_notifications(
    pool: &DbPool,
    user_exercise_id: DbId,
) -> Result<usize, sqlx::Error> {
    let Some(exercise) = UserExerciseRepo::get(pool, user_exercise_id).await? else {
        tracing::warn!(user_exercise_id, "Activation scheduling: unknown exercise instance");
        return Ok(0);
    };

    let Some(template) = ExerciseTemplateRepo::get(pool, exercise.exercise_template_id).await?
    else {
        tracing::warn!(
            user_exercise_id,
            template_id = exercise.exercise_template_id,
            "Activation scheduling: exercise template missing"
        );
        return Ok(0);
    };

    let morning_time = UserRepo::get(pool, exercise.user_id)
        .await?
        .and_then(|user| user.morning_notification_time);

    let today = Local::now().date_naive();
    let prompts = generate_prompts(
        &template.notifications,
        morning_time.as_deref(),
        ScheduleContext::on(today),
    );

    let mut created = 0;
    for (kind, prompt) in &prompts {
        NotificationRepo::create(
            pool,
            &CreateNotification {
                user_id: exercise.user_id,
                exercise_id: exercise.id,
                kind: kind.clone(),
                message: prompt.message.clone(),
                scheduled_for: prompt.scheduled_for,
            },
        )
        .await?;
        created += 1;
    }

    tracing::info!(user_exercise_id, created, "Scheduled exercise notifications");
    Ok(created)
}

/// Parse the template's configuration array and run the generator per entry.
///
/// Malformed entries are skipped with a warning; the remaining entries still
/// generate. Separated from the persistence step so the RNG never crosses an
/// await point.
fn generate_prompts(
    raw_configs: &serde_json::Value,
    morning_time: Option<&str>,
    ctx: ScheduleContext,
) -> Vec<(String, ScheduledPrompt)> {
    let Some(entries) = raw_configs.as_array() else {
        tracing::warn!("Activation scheduling: template notifications is not an array");
        return Vec::new();
    };

    let mut rng = rand::rng();
    let mut prompts = Vec::new();

    for entry in entries {
        let config: NotificationConfig = match serde_json::from_value(entry.clone()) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Activation scheduling: skipping malformed config");
                continue;
            }
        };

        let kind = config.kind.as_str().to_string();
        for prompt in schedule::generate(&config, morning_time, ctx, &mut rng) {
            prompts.push((kind.clone(), prompt));
        }
    }

    prompts
}
