//! Bearer-token gate for protected routes.
//!
//! Wrap any router with [`protect`]; handlers behind it can extract
//! `Extension<AuthenticatedUser>`.

use crate::core::token::TokenService;
use crate::domain::model::AuthenticatedUser;
use crate::utils::error::{AppError, Result};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";

pub fn protect<S>(router: Router<S>, tokens: Arc<TokenService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(middleware::from_fn_with_state(tokens, require_bearer))
}

pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("Invalid authorization header format"))?;

    let username = authorize(&tokens, header)?;
    tracing::debug!(path = %request.uri().path(), user = %username, "Bearer token accepted");

    request
        .extensions_mut()
        .insert(AuthenticatedUser { username });
    Ok(next.run(request).await)
}

/// Checks an `Authorization` header value and returns the verified identity.
pub fn authorize(tokens: &TokenService, header_value: &str) -> Result<String> {
    // 前綴大小寫敏感
    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

    if token.is_empty() {
        return Err(AppError::unauthorized("Missing bearer token"));
    }

    Ok(tokens.verify(token)?)
}
