//! Authentication and CSRF middleware

use axum::{
    extract::State,
    http::{Method, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

use crate::{error::ApiError, jwt::hash_token, state::AppState};

/// Name of the cookie carrying the CSRF token
pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
/// Header the client echoes the CSRF token in
pub const CSRF_HEADER: &str = "x-xsrf-token";

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    /// Hash of the bearer token the request was made with
    pub token_hash: String,
}

/// Authentication middleware: requires a valid, unrevoked bearer token
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // Extract the Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    // Check if it's a Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.token_service.validate(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    // Logout deletes the session row, so a valid signature is not enough
    let token_hash = hash_token(token);
    let active = state
        .session_repository
        .is_active(claims.sub, &token_hash)
        .await
        .map_err(|e| {
            error!("Failed to check session: {}", e);
            ApiError::InternalServerError
        })?;

    if !active {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        id: claims.sub,
        token_hash,
    });

    Ok(next.run(req).await)
}

/// Double-submit CSRF check for state-changing requests. A request that
/// carries the CSRF cookie must echo it in the `X-XSRF-TOKEN` header.
pub async fn csrf_middleware(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let state_changing = matches!(
        *req.method(),
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    );

    if state_changing {
        let jar = CookieJar::from_headers(req.headers());
        if let Some(cookie) = jar.get(CSRF_COOKIE) {
            let header = req
                .headers()
                .get(CSRF_HEADER)
                .and_then(|value| value.to_str().ok());
            if header != Some(cookie.value()) {
                return Err(ApiError::CsrfMismatch);
            }
        }
    }

    Ok(next.run(req).await)
}
