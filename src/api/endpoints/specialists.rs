//! Specialist catalog endpoints.
//!
//! - `GET /api/specialists`: catalog listing, optionally filtered by entitlement
//! - `POST /api/specialists/suggest`: recommendation from free-text notes

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{SpecialistProfile, SpecialistSummary};
use crate::specialists;

#[derive(Deserialize)]
pub struct CatalogQuery {
    pub premium: Option<bool>,
}

/// `GET /api/specialists`: all specialists, or only those available to
/// the caller's entitlement when `premium` is given.
pub async fn list(Query(query): Query<CatalogQuery>) -> Json<Vec<SpecialistSummary>> {
    let listing = match query.premium {
        Some(premium) => specialists::available_to(premium)
            .into_iter()
            .map(SpecialistSummary::from)
            .collect(),
        None => specialists::summaries(),
    };
    Json(listing)
}

#[derive(Deserialize)]
pub struct SuggestRequest {
    pub notes: String,
}

/// `POST /api/specialists/suggest`
pub async fn suggest(
    State(ctx): State<ApiContext>,
    Json(body): Json<SuggestRequest>,
) -> Result<Json<Vec<SpecialistProfile>>, ApiError> {
    if body.notes.trim().is_empty() {
        return Err(ApiError::BadRequest("notes are required".into()));
    }
    let matches = ctx.core.recommender().recommend(&body.notes).await?;
    Ok(Json(matches))
}
