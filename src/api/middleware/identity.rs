//! Caller identity middleware.
//!
//! The upstream identity provider authenticates the user and forwards the
//! resolved identity in `X-Authenticated-User`. This layer turns it into an
//! `OwnerIdentity` request extension for the handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::identity::OwnerIdentity;

pub const IDENTITY_HEADER: &str = "X-Authenticated-User";

/// Require a caller identity. Absent or blank header is 401.
pub async fn require_identity(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let raw = req
        .headers()
        .get(IDENTITY_HEADER)
        .and_then(|v| v.to_str().ok());

    let owner = match OwnerIdentity::resolve(raw) {
        Ok(owner) => owner,
        Err(e) => return ApiError::from(e).into_response(),
    };

    req.extensions_mut().insert(owner);
    next.run(req).await
}
