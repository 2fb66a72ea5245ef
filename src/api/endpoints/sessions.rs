//! Consultation session endpoints.
//!
//! - `POST /api/sessions`: create a session bound to one specialist
//! - `POST /api/sessions/:id/follow-up`: repeat consultation
//! - `GET /api/sessions`: history, most recent first
//! - `GET /api/sessions/:id`: one session

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::identity::OwnerIdentity;
use crate::models::ConsultationSession;
use crate::specialists;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub notes: String,
    pub specialist_id: Option<u32>,
}

/// `POST /api/sessions` → 201
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ConsultationSession>), ApiError> {
    let specialist = match body.specialist_id {
        Some(id) => Some(
            specialists::find(id)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown specialist {id}")))?,
        ),
        None => None,
    };

    let session = ctx
        .core
        .store()
        .create_session(owner.as_str(), &body.notes, specialist)?;
    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Deserialize, Default)]
pub struct FollowUpRequest {
    #[serde(default)]
    pub notes: String,
}

/// `POST /api/sessions/:id/follow-up` → 201
pub async fn follow_up(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
    body: Option<Json<FollowUpRequest>>,
) -> Result<(StatusCode, Json<ConsultationSession>), ApiError> {
    let notes = body.map(|Json(b)| b.notes).unwrap_or_default();
    let session = ctx
        .core
        .store()
        .create_follow_up_session(owner.as_str(), &session_id, &notes)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /api/sessions`
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
) -> Result<Json<Vec<ConsultationSession>>, ApiError> {
    Ok(Json(ctx.core.store().list_sessions(owner.as_str())?))
}

/// `GET /api/sessions/:id`
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
) -> Result<Json<ConsultationSession>, ApiError> {
    Ok(Json(ctx.core.store().get_session(owner.as_str(), &session_id)?))
}
