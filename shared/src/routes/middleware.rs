use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::AuthenticatedClaims;
use crate::context::AppContext;
use chatline_error::AppError;

/// Reject requests without a valid bearer token; attach the verified claims
/// otherwise.
pub async fn require_bearer(
    State(app_context): State<Arc<AppContext>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let claims = app_context.verifier.verify_header(header)?;

    tracing::debug!(sub = %claims.sub, "Bearer token verified");
    req.extensions_mut().insert(AuthenticatedClaims(claims));

    Ok(next.run(req).await)
}
