//! Caller identity extractor.
//!
//! Authentication and authorization are handled upstream; the gateway
//! terminates the session and forwards the caller's id in the `x-user-id`
//! header. This extractor only parses that header — a request without it is
//! rejected with 401.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cadence_core::types::DbId;

use crate::error::AppError;

/// Header set by the upstream gateway.
const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, as asserted by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: DbId,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::Unauthorized("missing or invalid caller identity".to_string())
            })?;

        Ok(AuthUser { user_id })
    }
}
