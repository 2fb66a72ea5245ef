//! `POST /api/sessions/:id/report`: (re)generate the report from a
//! transcript. Overwrites an earlier report on success; leaves the session
//! unchanged on failure.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::identity::OwnerIdentity;
use crate::models::{MedicalReport, TranscriptEntry};

#[derive(Deserialize)]
pub struct GenerateReportRequest {
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

pub async fn generate(
    State(ctx): State<ApiContext>,
    Extension(owner): Extension<OwnerIdentity>,
    Path(session_id): Path<String>,
    Json(body): Json<GenerateReportRequest>,
) -> Result<Json<MedicalReport>, ApiError> {
    let report = ctx
        .core
        .reports()
        .generate_for(owner.as_str(), &session_id, &body.transcript)
        .await?;
    Ok(Json(report))
}
