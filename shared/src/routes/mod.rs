// ============================================================================
// Axum Routes Module
// ============================================================================
//
// - messages.rs: Submit a message, read conversation history
// - health.rs: Health check and metrics endpoints
// - middleware.rs: Bearer token gate
//
// ============================================================================

pub mod health;
pub mod messages;
pub mod middleware;

use axum::{
    extract::Request,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

/// Create the ingress router
///
/// `/health` and `/metrics` are open; everything under `/v1` needs a valid
/// bearer token.
pub fn create_router(app_context: Arc<AppContext>) -> Router {
    let v1 = Router::new()
        .route("/v1/messages", post(messages::create_message))
        .route(
            "/v1/conversations/:id/messages",
            get(messages::list_messages),
        )
        .route_layer(from_fn_with_state(
            app_context.clone(),
            middleware::require_bearer,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .merge(v1)
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::info_span!(
                    "http_request",
                    component = "api",
                    method = %req.method(),
                    path = %req.uri().path(),
                )
            }),
        )
        .with_state(app_context)
}
