/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are naive local-clock values.
///
/// The study runs in a single timezone; schedule times are stored exactly as
/// the participant's wall clock reads them.
pub type Timestamp = chrono::NaiveDateTime;
