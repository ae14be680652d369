//! Exercise instance lifecycle.
//!
//! This module lives in `core` (zero internal deps) so it can be used by
//! both the repository layer and the API handlers.

/// Status of an exercise not yet released to the participant.
pub const STATUS_LOCKED: &str = "locked";

/// Status of an exercise the participant may start.
pub const STATUS_AVAILABLE: &str = "available";

/// Status of an exercise the participant has opened but not finished.
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Terminal status of a finished exercise.
pub const STATUS_COMPLETED: &str = "completed";

/// Returns the set of valid target statuses reachable from `from`.
///
/// `completed` is terminal. An unknown status has no transitions.
pub fn valid_transitions(from: &str) -> &'static [&'static str] {
    match from {
        STATUS_LOCKED => &[STATUS_AVAILABLE],
        STATUS_AVAILABLE => &[STATUS_IN_PROGRESS, STATUS_LOCKED],
        STATUS_IN_PROGRESS => &[STATUS_COMPLETED],
        _ => &[],
    }
}

/// Check whether a transition from `from` to `to` is valid.
pub fn can_transition(from: &str, to: &str) -> bool {
    valid_transitions(from).contains(&to)
}

/// Validate a transition, returning an error message for invalid ones.
pub fn validate_transition(from: &str, to: &str) -> Result<(), String> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(format!("Invalid exercise transition: {from} -> {to}"))
    }
}
