//! Notification schedule generation.
//!
//! Translates the declarative notification configuration embedded in an
//! exercise template into concrete `(timestamp, message)` prompts for one
//! exercise instance. Pure: no I/O, no clock access. Callers supply the
//! calendar dates via [`ScheduleContext`] and the randomness source via a
//! [`Rng`], so `fixed`/`user_time` generation is fully deterministic and
//! `random` generation is seed-injectable in tests.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default message for the participant-chosen morning prompt.
pub const DEFAULT_MORNING_MESSAGE: &str = "Time for your daily exercise";

/// Default message for fixed and randomized prompts.
pub const DEFAULT_EXERCISE_MESSAGE: &str = "Time for your exercise";

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// Categorical notification tag.
///
/// Informational only: it is stored on the generated record and shown to
/// study coordinators, but does not alter generation logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Morning,
    Random,
    Scheduled,
    #[default]
    Reminder,
}

impl NotificationKind {
    /// Stable string form, matching the stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Morning => "morning",
            NotificationKind::Random => "random",
            NotificationKind::Scheduled => "scheduled",
            NotificationKind::Reminder => "reminder",
        }
    }
}

/// Generation strategy for one notification configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleType {
    /// One prompt per entry in `times`.
    Fixed,
    /// One prompt per entry in `time_ranges`, drawn uniformly inside each.
    Random,
    /// A single prompt at the participant's chosen morning time.
    UserTime,
    /// Anything this version does not recognize. Generates nothing.
    #[serde(other)]
    Unknown,
}

/// A `[start, end)` clock window for randomized prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive `"HH:MM"` lower bound.
    pub start: String,
    /// Exclusive `"HH:MM"` upper bound.
    pub end: String,
}

/// One notification configuration from an exercise template.
///
/// Templates embed a JSON array of these; the camelCase field names match
/// the published template format, which is immutable once in use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    /// Categorical tag, carried onto each generated record.
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    /// Which generation strategy applies.
    pub schedule_type: ScheduleType,
    /// `"HH:MM"` entries for [`ScheduleType::Fixed`].
    #[serde(default)]
    pub times: Vec<String>,
    /// Clock windows for [`ScheduleType::Random`].
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
    /// Message texts, index-aligned with `times`/`time_ranges`.
    /// A missing or empty entry falls back to a default string.
    #[serde(default)]
    pub messages: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generation context
// ---------------------------------------------------------------------------

/// Calendar dates the generator combines clock times with.
///
/// `reference_date` anchors `fixed` and `user_time` prompts; `random_date`
/// anchors randomized draws. Keeping them separate makes the choice explicit
/// instead of an accident of when the generator runs: [`ScheduleContext::on`]
/// pins every branch to one date (the normal case — at activation both are
/// "today"), while [`with_random_date`](Self::with_random_date) lets a caller
/// generating for a future day pin randomized draws to a different one.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleContext {
    /// Date for `fixed` and `user_time` prompts.
    pub reference_date: NaiveDate,
    /// Date for `random` prompts.
    pub random_date: NaiveDate,
}

impl ScheduleContext {
    /// Anchor every schedule branch to the same calendar date.
    pub fn on(date: NaiveDate) -> Self {
        Self {
            reference_date: date,
            random_date: date,
        }
    }

    /// Anchor randomized draws to a different date.
    pub fn with_random_date(mut self, date: NaiveDate) -> Self {
        self.random_date = date;
        self
    }
}

/// One concrete prompt: when to deliver it and what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledPrompt {
    pub scheduled_for: NaiveDateTime,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Generate the concrete prompts for one notification configuration.
///
/// Configuration gaps are never fatal: unparseable clock strings are
/// silently skipped, missing message entries fall back to a default, and an
/// unrecognized schedule type produces an empty sequence.
pub fn generate<R: Rng + ?Sized>(
    config: &NotificationConfig,
    user_morning_time: Option<&str>,
    ctx: ScheduleContext,
    rng: &mut R,
) -> Vec<ScheduledPrompt> {
    match config.schedule_type {
        ScheduleType::UserTime => {
            let Some(time) = user_morning_time.and_then(parse_clock) else {
                return Vec::new();
            };
            vec![ScheduledPrompt {
                scheduled_for: ctx.reference_date.and_time(time),
                message: message_at(&config.messages, 0, DEFAULT_MORNING_MESSAGE),
            }]
        }

        ScheduleType::Fixed => config
            .times
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let time = parse_clock(raw)?;
                Some(ScheduledPrompt {
                    scheduled_for: ctx.reference_date.and_time(time),
                    message: message_at(&config.messages, index, DEFAULT_EXERCISE_MESSAGE),
                })
            })
            .collect(),

        ScheduleType::Random => config
            .time_ranges
            .iter()
            .enumerate()
            .filter_map(|(index, range)| {
                let time = draw_in_range(range, rng)?;
                Some(ScheduledPrompt {
                    scheduled_for: ctx.random_date.and_time(time),
                    message: message_at(&config.messages, index, DEFAULT_EXERCISE_MESSAGE),
                })
            })
            .collect(),

        ScheduleType::Unknown => Vec::new(),
    }
}

/// Parse an `"HH:MM"` clock string. Returns `None` for anything malformed.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.split_once(':')?;
    let hours: u32 = hours.trim().parse().ok()?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Message at `index`, falling back to `default` when the entry is missing
/// or empty.
fn message_at(messages: &[String], index: usize, default: &str) -> String {
    messages
        .get(index)
        .filter(|m| !m.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Draw a uniformly random clock time in `[start, end)`.
///
/// The draw is over whole minutes since midnight. A degenerate window
/// (`end <= start`) collapses to `start`. Returns `None` when either bound
/// is unparseable.
fn draw_in_range<R: Rng + ?Sized>(range: &TimeRange, rng: &mut R) -> Option<NaiveTime> {
    let start = parse_clock(&range.start)?;
    let end = parse_clock(&range.end)?;

    let start_min = start.hour() * 60 + start.minute();
    let end_min = end.hour() * 60 + end.minute();

    let minute_of_day = if end_min > start_min {
        rng.random_range(start_min..end_min)
    } else {
        start_min
    };

    NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
