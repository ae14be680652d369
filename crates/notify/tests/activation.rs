//! Integration tests for activation-time schedule persistence.

use sqlx::PgPool;

use cadence_db::repositories::{ExerciseTemplateRepo, UserExerciseRepo, UserRepo};
use cadence_notify::schedule_exercise_notifications;

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_persists_one_row_per_generated_prompt(pool: PgPool) {
    let user_id = UserRepo::create(&pool, "p1@example.com", "Participant")
        .await
        .unwrap();
    UserRepo::set_morning_time(&pool, user_id, "08:15").await.unwrap();

    let configs = serde_json::json!([
        { "type": "morning", "scheduleType": "user_time", "messages": ["Good morning"] },
        {
            "type": "scheduled",
            "scheduleType": "fixed",
            "times": ["13:00", "18:30"],
            "messages": ["Midday check-in", "Evening check-in"],
        },
    ]);
    let template_id = ExerciseTemplateRepo::create(&pool, "Mood diary", &configs)
        .await
        .unwrap();
    let exercise_id = UserExerciseRepo::create(&pool, user_id, template_id)
        .await
        .unwrap();

    let created = schedule_exercise_notifications(&pool, exercise_id)
        .await
        .unwrap();
    assert_eq!(created, 3);

    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT kind, message FROM notifications WHERE exercise_id = $1 ORDER BY scheduled_for",
    )
    .bind(exercise_id)
    .fetch_all(&pool)
    .await
    .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.contains(&("morning".to_string(), "Good morning".to_string())));
    assert!(rows.contains(&("scheduled".to_string(), "Midday check-in".to_string())));
    assert!(rows.contains(&("scheduled".to_string(), "Evening check-in".to_string())));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_without_morning_time_skips_user_time_configs(pool: PgPool) {
    let user_id = UserRepo::create(&pool, "p1@example.com", "Participant")
        .await
        .unwrap();

    let configs = serde_json::json!([
        { "type": "morning", "scheduleType": "user_time", "messages": [] },
    ]);
    let template_id = ExerciseTemplateRepo::create(&pool, "Mood diary", &configs)
        .await
        .unwrap();
    let exercise_id = UserExerciseRepo::create(&pool, user_id, template_id)
        .await
        .unwrap();

    let created = schedule_exercise_notifications(&pool, exercise_id)
        .await
        .unwrap();
    assert_eq!(created, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn activation_for_an_unknown_instance_creates_nothing(pool: PgPool) {
    let created = schedule_exercise_notifications(&pool, 9999).await.unwrap();
    assert_eq!(created, 0);
}
