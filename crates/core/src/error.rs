//! Shared domain error type.

use crate::types::DbId;

/// Domain-level errors surfaced by core logic and the repository layer.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity lookup found no row.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"Notification"`.
        entity: &'static str,
        /// The id that was looked up.
        id: DbId,
    },

    /// Input failed domain validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation conflicts with current state (e.g. an invalid
    /// lifecycle transition).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),
}
