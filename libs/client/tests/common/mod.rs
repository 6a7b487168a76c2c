//! Fake Recipe Box API for client tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use client::{ApiClient, MemoryStorage, Notifier, SessionContext};
use serde::Deserialize;
use serde_json::{Value, json};

pub const CSRF_TOKEN: &str = "csrf-123";
pub const PASSWORD: &str = "secret123";

/// What the fake server saw and holds
#[derive(Default)]
pub struct Fake {
    pub hits: Mutex<Vec<String>>,
    pub favorites: Mutex<HashSet<(i64, i64)>>,
    pub revoked: Mutex<HashSet<String>>,
}

impl Fake {
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    fn hit(&self, entry: impl Into<String>) {
        self.hits.lock().unwrap().push(entry.into());
    }
}

type Shared = Arc<Fake>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error": message}))).into_response()
}

fn csrf_ok(headers: &HeaderMap) -> bool {
    headers.get("x-xsrf-token").and_then(|v| v.to_str().ok()) == Some(CSRF_TOKEN)
}

/// User id encoded in the bearer token `token-<id>`
fn bearer_user(fake: &Fake, headers: &HeaderMap) -> Option<i64> {
    let token = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;
    if fake.revoked.lock().unwrap().contains(token) {
        return None;
    }
    token.strip_prefix("token-")?.parse().ok()
}

fn user(id: i64) -> Value {
    json!({"id": id, "name": format!("User {}", id), "email": format!("user{}@x.com", id)})
}

fn recipe(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "external_id": 1000 + id,
        "title": title,
        "image": null,
        "ready_in_minutes": 10,
        "servings": 2,
        "summary": null,
        "instructions": null,
        "source_url": null,
        "ingredients": [{"id": 1, "external_id": 11215, "name": "garlic", "amount": 1.0, "unit": "clove"}],
        "dish_types": ["dinner"]
    })
}

async fn csrf_cookie(State(fake): State<Shared>) -> impl IntoResponse {
    fake.hit("GET /csrf-cookie");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, format!("XSRF-TOKEN={}; Path=/", CSRF_TOKEN))],
    )
}

#[derive(Deserialize)]
struct Login {
    email: String,
    password: String,
}

async fn login(State(fake): State<Shared>, headers: HeaderMap, Json(body): Json<Login>) -> Response {
    fake.hit("POST /auth/login");
    if !csrf_ok(&headers) {
        return error(StatusCode::from_u16(419).unwrap(), "CSRF token mismatch");
    }
    if body.email.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "success": false,
                "error": "The given data was invalid.",
                "errors": {"email": ["The email field is required."]}
            })),
        )
            .into_response();
    }
    if body.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    let id: i64 = body
        .email
        .trim_start_matches("user")
        .split('@')
        .next()
        .and_then(|id| id.parse().ok())
        .unwrap_or(1);
    Json(json!({
        "success": true,
        "message": "Login successful",
        "user": user(id),
        "token": format!("token-{}", id),
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn logout(State(fake): State<Shared>, headers: HeaderMap) -> Response {
    fake.hit("POST /auth/logout");
    if bearer_user(&fake, &headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        fake.revoked.lock().unwrap().insert(token.to_string());
    }
    Json(json!({"success": true, "message": "Logged out successfully"})).into_response()
}

async fn current_user(State(fake): State<Shared>, headers: HeaderMap) -> Response {
    match bearer_user(&fake, &headers) {
        Some(id) => Json(json!({"success": true, "user": user(id)})).into_response(),
        None => error(StatusCode::UNAUTHORIZED, "Unauthorized"),
    }
}

#[derive(Deserialize)]
struct Search {
    query: Option<String>,
}

async fn search(State(fake): State<Shared>, Query(params): Query<Search>) -> Response {
    let query = params.query.unwrap_or_default();
    fake.hit(format!("GET /recipe {}", query));
    if query == "slow" {
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    if query == "broken" {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
    }
    let data = vec![recipe(1, &format!("{} one", query)), recipe(2, &format!("{} two", query))];
    Json(json!({"status": "success", "source": "api", "count": data.len(), "data": data}))
        .into_response()
}

#[derive(Deserialize)]
struct RecipeId {
    recipe_id: i64,
}

async fn add_favorite(State(fake): State<Shared>, headers: HeaderMap, Json(body): Json<RecipeId>) -> Response {
    fake.hit(format!("POST /favorites {}", body.recipe_id));
    if !csrf_ok(&headers) {
        return error(StatusCode::from_u16(419).unwrap(), "CSRF token mismatch");
    }
    let Some(user_id) = bearer_user(&fake, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if !fake.favorites.lock().unwrap().insert((user_id, body.recipe_id)) {
        return error(StatusCode::CONFLICT, "Recipe is already in favorites");
    }
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Recipe added to favorites"})),
    )
        .into_response()
}

async fn remove_favorite(State(fake): State<Shared>, headers: HeaderMap, Json(body): Json<RecipeId>) -> Response {
    fake.hit(format!("DELETE /favorites {}", body.recipe_id));
    if !csrf_ok(&headers) {
        return error(StatusCode::from_u16(419).unwrap(), "CSRF token mismatch");
    }
    let Some(user_id) = bearer_user(&fake, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if !fake.favorites.lock().unwrap().remove(&(user_id, body.recipe_id)) {
        return error(StatusCode::NOT_FOUND, "Favorite not found");
    }
    Json(json!({"success": true, "message": "Recipe removed from favorites"})).into_response()
}

async fn list_favorites(State(fake): State<Shared>, headers: HeaderMap) -> Response {
    let Some(user_id) = bearer_user(&fake, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let mut ids: Vec<i64> = fake
        .favorites
        .lock()
        .unwrap()
        .iter()
        .filter(|(user, _)| *user == user_id)
        .map(|(_, recipe_id)| *recipe_id)
        .collect();
    ids.sort();
    let data: Vec<Value> = ids
        .iter()
        .map(|id| recipe(*id, &format!("Recipe {}", id)))
        .collect();
    Json(json!({
        "status": "success",
        "count": data.len(),
        "total": data.len(),
        "current_page": 1,
        "per_page": 10,
        "last_page": 1,
        "data": data
    }))
    .into_response()
}

async fn check_favorite(
    State(fake): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<RecipeId>,
) -> Response {
    let Some(user_id) = bearer_user(&fake, &headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let saved = fake
        .favorites
        .lock()
        .unwrap()
        .contains(&(user_id, query.recipe_id));
    Json(json!({"is_favorited": saved})).into_response()
}

/// Start the fake API and return its base URL and state
pub async fn spawn_fake() -> (String, Shared) {
    let fake: Shared = Arc::default();
    let router = Router::new()
        .route("/csrf-cookie", get(csrf_cookie))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/user", get(current_user))
        .route("/recipe", get(search))
        .route(
            "/favorites",
            get(list_favorites).post(add_favorite).delete(remove_favorite),
        )
        .route("/favorites/check", get(check_favorite))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{}", addr), fake)
}

/// Fresh session, notifier and client against `base_url`
pub fn connect(base_url: &str) -> (ApiClient, SessionContext, Notifier) {
    let session = SessionContext::new(Arc::new(MemoryStorage::default()));
    let notifier = Notifier::default();
    let api = ApiClient::new(base_url, session.clone()).unwrap();
    (api, session, notifier)
}

/// Base URL nothing listens on
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
