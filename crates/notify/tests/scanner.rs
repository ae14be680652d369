//! Integration tests for the dispatch scanner.
//!
//! Runs real ticks against a real database, with recording mock transports
//! standing in for the push and SMTP wires.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;

use cadence_core::types::{DbId, Timestamp};
use cadence_db::models::notification::CreateNotification;
use cadence_db::repositories::{
    ExerciseTemplateRepo, NotificationRepo, UserExerciseRepo, UserRepo,
};
use cadence_notify::{
    DeliveryOutcome, DispatchScanner, EmailChannel, EmailError, Mailer, PushChannel, PushError,
    PushSubscription, PushTransport,
};

// ---------------------------------------------------------------------------
// Mock transports
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum PushBehavior {
    Deliver,
    Gone,
    Fail,
}

struct MockPush {
    behavior: PushBehavior,
    sent: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockPush {
    fn new(behavior: PushBehavior) -> (Arc<Self>, Arc<Mutex<Vec<serde_json::Value>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(Self {
            behavior,
            sent: Arc::clone(&sent),
        });
        (transport, sent)
    }
}

#[async_trait::async_trait]
impl PushTransport for MockPush {
    async fn send(
        &self,
        _subscription: &PushSubscription,
        payload: &serde_json::Value,
    ) -> Result<(), PushError> {
        match self.behavior {
            PushBehavior::Deliver => {
                self.sent.lock().unwrap().push(payload.clone());
                Ok(())
            }
            PushBehavior::Gone => Err(PushError::Gone),
            PushBehavior::Fail => Err(PushError::HttpStatus(502)),
        }
    }
}

struct MockMailer {
    fail: bool,
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockMailer {
    fn new(fail: bool) -> (Arc<Self>, Arc<Mutex<Vec<(String, String)>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let mailer = Arc::new(Self {
            fail,
            sent: Arc::clone(&sent),
        });
        (mailer, sent)
    }
}

#[async_trait::async_trait]
impl Mailer for MockMailer {
    async fn send_html(&self, to: &str, subject: &str, _html: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Build("forced failure".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ts(hour: u32, minute: u32) -> Timestamp {
    NaiveDate::from_ymd_opt(2024, 3, 10)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn seed_user(pool: &PgPool, with_subscription: bool) -> DbId {
    let user_id = UserRepo::create(pool, "p1@example.com", "Participant One")
        .await
        .unwrap();
    if with_subscription {
        let subscription = serde_json::json!({
            "endpoint": "https://push.example/sub/1",
            "p256dh": "key",
            "auth": "secret",
        });
        UserRepo::set_push_subscription(pool, user_id, &subscription)
            .await
            .unwrap();
    }
    user_id
}

async fn seed_notification(pool: &PgPool, user_id: DbId, scheduled_for: Timestamp) -> DbId {
    let template_id = ExerciseTemplateRepo::create(pool, "Daily log", &serde_json::json!([]))
        .await
        .unwrap();
    let exercise_id = UserExerciseRepo::create(pool, user_id, template_id)
        .await
        .unwrap();
    NotificationRepo::create(
        pool,
        &CreateNotification {
            user_id,
            exercise_id,
            kind: "scheduled".to_string(),
            message: "Time for your exercise".to_string(),
            scheduled_for,
        },
    )
    .await
    .unwrap()
}

fn scanner(
    pool: &PgPool,
    push: Arc<dyn PushTransport>,
    mailer: Option<Arc<dyn Mailer>>,
) -> DispatchScanner {
    DispatchScanner::new(
        pool.clone(),
        PushChannel::new(pool.clone(), push),
        EmailChannel::new(pool.clone(), mailer, "https://study.example".to_string()),
    )
}

// ---------------------------------------------------------------------------
// Tick behavior
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn tick_dispatches_on_both_channels_and_stamps_the_record(pool: PgPool) {
    let user_id = seed_user(&pool, true).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, push_sent) = MockPush::new(PushBehavior::Deliver);
    let (mailer, mail_sent) = MockMailer::new(false);
    let scanner = scanner(&pool, push, Some(mailer));

    let summary = scanner.tick(ts(12, 0)).await.unwrap();

    assert_eq!(summary.due, 1);
    assert_eq!(summary.push_delivered, 1);
    assert_eq!(summary.email_delivered, 1);

    assert_eq!(push_sent.lock().unwrap().len(), 1);
    assert_eq!(push_sent.lock().unwrap()[0]["body"], "Time for your exercise");

    let mails = mail_sent.lock().unwrap();
    assert_eq!(mails.len(), 1);
    assert_eq!(mails[0].0, "p1@example.com");

    // The first mark_sent wins; the email channel's stamp is a no-op and the
    // record keeps the tick's timestamp.
    let row = NotificationRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.sent_at, Some(ts(12, 0)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn a_stamped_record_is_not_selected_by_the_next_tick(pool: PgPool) {
    let user_id = seed_user(&pool, true).await;
    seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, push_sent) = MockPush::new(PushBehavior::Deliver);
    let (mailer, _) = MockMailer::new(false);
    let scanner = scanner(&pool, push, Some(mailer));

    scanner.tick(ts(12, 0)).await.unwrap();
    let second = scanner.tick(ts(12, 1)).await.unwrap();

    assert_eq!(second.due, 0);
    assert_eq!(push_sent.lock().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn records_outside_the_window_are_not_selected(pool: PgPool) {
    let user_id = seed_user(&pool, true).await;
    seed_notification(&pool, user_id, ts(12, 10)).await;

    let (push, _) = MockPush::new(PushBehavior::Deliver);
    let (mailer, _) = MockMailer::new(false);
    let scanner = scanner(&pool, push, Some(mailer));

    let summary = scanner.tick(ts(12, 0)).await.unwrap();
    assert_eq!(summary.due, 0);
}

// ---------------------------------------------------------------------------
// Channel independence
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn push_skip_without_subscription_still_emails(pool: PgPool) {
    let user_id = seed_user(&pool, false).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, push_sent) = MockPush::new(PushBehavior::Deliver);
    let (mailer, mail_sent) = MockMailer::new(false);
    let scanner = scanner(&pool, push, Some(mailer));

    let summary = scanner.tick(ts(12, 0)).await.unwrap();

    assert_eq!(summary.push_delivered, 0);
    assert_eq!(summary.email_delivered, 1);
    assert!(push_sent.lock().unwrap().is_empty());
    assert_eq!(mail_sent.lock().unwrap().len(), 1);

    // The email attempt alone stamps the record.
    let row = NotificationRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.sent_at, Some(ts(12, 0)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn push_skip_alone_does_not_stamp_the_record(pool: PgPool) {
    let user_id = seed_user(&pool, false).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, _) = MockPush::new(PushBehavior::Deliver);
    // No mailer configured: the only possible outcome is a push skip.
    let scanner = scanner(&pool, push, None);

    let summary = scanner.tick(ts(12, 0)).await.unwrap();

    assert_eq!(summary.due, 1);
    assert_eq!(summary.push_delivered, 0);
    assert_eq!(summary.email_delivered, 0);

    let row = NotificationRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.sent_at, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn gone_endpoint_clears_the_stored_subscription(pool: PgPool) {
    let user_id = seed_user(&pool, true).await;
    seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, _) = MockPush::new(PushBehavior::Gone);
    let (mailer, _) = MockMailer::new(false);
    let scanner = scanner(&pool, push, Some(mailer));

    let summary = scanner.tick(ts(12, 0)).await.unwrap();
    assert_eq!(summary.push_delivered, 0);
    assert_eq!(summary.email_delivered, 1);

    let user = UserRepo::get(&pool, user_id).await.unwrap().unwrap();
    assert!(user.push_subscription.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn channel_failures_do_not_propagate_or_stamp(pool: PgPool) {
    let user_id = seed_user(&pool, true).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;

    let (push, _) = MockPush::new(PushBehavior::Fail);
    let (mailer, _) = MockMailer::new(true);
    let scanner = scanner(&pool, push, Some(mailer));

    let summary = scanner.tick(ts(12, 0)).await.unwrap();

    assert_eq!(summary.due, 1);
    assert_eq!(summary.push_delivered, 0);
    assert_eq!(summary.email_delivered, 0);

    // Neither attempt succeeded, so the record stays pending and the next
    // tick inside the window picks it up again.
    let row = NotificationRepo::get(&pool, id).await.unwrap().unwrap();
    assert_eq!(row.sent_at, None);
}

// ---------------------------------------------------------------------------
// Channel outcomes (direct)
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn push_channel_reports_skip_without_subscription(pool: PgPool) {
    let user_id = seed_user(&pool, false).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;
    let notification = NotificationRepo::get(&pool, id).await.unwrap().unwrap();

    let (push, _) = MockPush::new(PushBehavior::Deliver);
    let channel = PushChannel::new(pool.clone(), push);

    let outcome = channel.send(&notification).await;
    assert_matches!(outcome, DeliveryOutcome::Skipped("no push subscription"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn email_channel_reports_skip_when_not_configured(pool: PgPool) {
    let user_id = seed_user(&pool, false).await;
    let id = seed_notification(&pool, user_id, ts(12, 2)).await;
    let notification = NotificationRepo::get(&pool, id).await.unwrap().unwrap();

    let channel = EmailChannel::new(pool.clone(), None, "https://study.example".to_string());

    let outcome = channel.send(&notification).await;
    assert_matches!(outcome, DeliveryOutcome::Skipped("email not configured"));
}
