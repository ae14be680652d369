//! Per-attempt delivery result.

/// Result of one delivery-channel attempt for one notification record.
///
/// Channels never propagate errors into the dispatch loop; they report one
/// of these instead, so tests can assert on outcomes without inspecting
/// logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The transport accepted the message.
    Delivered,
    /// Nothing to attempt for this record (e.g. no stored subscription,
    /// channel not configured). Not an error.
    Skipped(&'static str),
    /// The attempt failed. The record is left as attempted, not retried.
    Failed(String),
}

impl DeliveryOutcome {
    /// `true` for [`DeliveryOutcome::Delivered`].
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}
