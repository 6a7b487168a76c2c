//! API service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{CSRF_COOKIE, auth_middleware, csrf_middleware},
};

pub mod auth;
pub mod favorites;
pub mod recipes;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/update", post(auth::update))
        .route("/auth/user", get(auth::current_user))
        .route(
            "/favorites",
            get(favorites::list)
                .post(favorites::add)
                .delete(favorites::remove),
        )
        .route("/favorites/check", get(favorites::check))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/csrf-cookie", get(csrf_cookie))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/recipe", get(recipes::search))
        .merge(protected_routes)
        .layer(middleware::from_fn(csrf_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool).await;

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "service": "recipe-api",
            "database": database,
        })),
    )
}

/// Issue a fresh CSRF cookie for state-changing requests
pub async fn csrf_cookie(jar: CookieJar) -> impl IntoResponse {
    let cookie = Cookie::build((CSRF_COOKIE, Uuid::new_v4().to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .http_only(false)
        .build();

    (jar.add(cookie), StatusCode::NO_CONTENT)
}
