//! Delivery channels.
//!
//! Each channel resolves its own delivery target from the user record,
//! attempts delivery, and reports a
//! [`DeliveryOutcome`](crate::outcome::DeliveryOutcome). Channel failures
//! are logged and absorbed at this boundary, never propagated to the
//! dispatch loop.

pub mod email;
pub mod push;
