//! Voice call endpoints.
//!
//! - `POST /api/sessions/:id/call`: start a call with the bound specialist
//! - `GET /api/sessions/:id/call`: current call snapshot
//! - `POST /api/sessions/:id/call/end`: end the call, generate the report

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallOutcomeView};
use crate::identity::OwnerIdentity;
use crate::voice::CallSnapshot;

/// Start the call and return once the backend reports it connected.
/// A failed start leaves nothing registered for the session.
pub async fn start(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
) -> Result<Json<CallSnapshot>, ApiError> {
    let session = ctx.core.store().get_session(owner.as_str(), &session_id)?;
    let controller = ctx.core.call_controller(&session.session_id)?;
    if let Err(e) = controller.start_call(session).await {
        ctx.core.release_call(&session_id);
        return Err(e.into());
    }
    Ok(Json(controller.snapshot()))
}

pub async fn status(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
) -> Result<Json<CallSnapshot>, ApiError> {
    // Ownership check before exposing anything about the call.
    ctx.core.store().get_session(owner.as_str(), &session_id)?;
    let controller = ctx
        .core
        .existing_call(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("no call for session {session_id}")))?;
    Ok(Json(controller.snapshot()))
}

pub async fn end(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
) -> Result<Json<CallOutcomeView>, ApiError> {
    ctx.core.store().get_session(owner.as_str(), &session_id)?;
    let controller = ctx
        .core
        .existing_call(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("no call for session {session_id}")))?;
    let outcome = controller.end_call().await;
    ctx.core.release_call(&session_id);
    Ok(Json(outcome?.into()))
}
