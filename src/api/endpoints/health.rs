//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub completion_model: String,
    pub voice_enabled: bool,
}

/// `GET /api/health`: liveness, no identity required.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        completion_model: ctx.core.config.completion.model.clone(),
        voice_enabled: ctx.core.config.voice_backend.url.is_some(),
    })
}
