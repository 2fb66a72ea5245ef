//! API router.
//!
//! Routes are nested under `/api/`. Everything except the health check
//! requires a caller identity.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Build the consultation API router.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/specialists", get(endpoints::specialists::list))
        .route("/specialists/suggest", post(endpoints::specialists::suggest))
        .route(
            "/sessions",
            get(endpoints::sessions::list).post(endpoints::sessions::create),
        )
        .route("/sessions/:id", get(endpoints::sessions::detail))
        .route("/sessions/:id/follow-up", post(endpoints::sessions::follow_up))
        .route("/sessions/:id/report", post(endpoints::reports::generate))
        .route(
            "/sessions/:id/call",
            get(endpoints::calls::status).post(endpoints::calls::start),
        )
        .route("/sessions/:id/call/end", post(endpoints::calls::end))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::identity::require_identity));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected.merge(public))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
