mod common;

use api::{
    AppState,
    config::UpsertPolicy,
    models::recipe::NewRecipe,
    provider::ProviderRecipe,
};
use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use common::{StubProvider, db_app, provider_recipe, register_and_login, send, unique_email, unique_external_id};

/// Store recipes with the given titles and return their ids
async fn seed(state: &AppState, titles: &[&str]) -> Vec<i64> {
    let mut ids = Vec::new();
    for title in titles {
        let recipe: ProviderRecipe =
            serde_json::from_value(provider_recipe(unique_external_id(), title)).unwrap();
        let id = state
            .recipe_repository
            .upsert(&NewRecipe::from(recipe), UpsertPolicy::Refresh)
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

async fn favorite(app: &axum::Router, token: &str, recipe_id: i64) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        "/favorites",
        Some(token),
        Some(json!({ "recipe_id": recipe_id })),
    )
    .await
}

async fn is_favorited(app: &axum::Router, token: &str, recipe_id: i64) -> bool {
    let uri = format!("/favorites/check?recipe_id={}", recipe_id);
    let (status, body) = send(app, Method::GET, &uri, Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["is_favorited"].as_bool().unwrap()
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn add_check_and_remove_a_favorite() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("fav")).await;
    let ids = seed(&state, &["Pad Thai"]).await;

    assert!(!is_favorited(&app, &token, ids[0]).await);

    let (status, body) = favorite(&app, &token, ids[0]).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["recipe_id"], ids[0]);
    assert!(is_favorited(&app, &token, ids[0]).await);

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/favorites",
        Some(&token),
        Some(json!({ "recipe_id": ids[0] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(!is_favorited(&app, &token, ids[0]).await);
}

#[tokio::test]
async fn duplicate_favorite_is_a_conflict() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("dupfav")).await;
    let ids = seed(&state, &["Ramen"]).await;

    let (status, _) = favorite(&app, &token, ids[0]).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = favorite(&app, &token, ids[0]).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(&app, Method::GET, "/favorites", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn removing_a_missing_favorite_is_not_found() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("nofav")).await;
    let ids = seed(&state, &["Pho"]).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/favorites",
        Some(&token),
        Some(json!({ "recipe_id": ids[0] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_or_missing_recipe_is_rejected() {
    let Some((app, _)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("unknown")).await;

    let (status, body) = favorite(&app, &token, i64::MAX).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["recipe_id"].is_array());

    let (status, body) = send(&app, Method::POST, "/favorites", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["recipe_id"].is_array());
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("list")).await;
    let ids = seed(&state, &["Banana Bread", "Apple Pie", "Cherry Tart", "Apple Crumble"]).await;
    for id in &ids {
        let (status, _) = favorite(&app, &token, *id).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/favorites?sort_by_name=true", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec!["Apple Crumble", "Apple Pie", "Banana Bread", "Cherry Tart"]
    );

    let (status, body) = send(&app, Method::GET, "/favorites", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "Apple Crumble");
    assert_eq!(body["data"][3]["title"], "Banana Bread");

    let (status, body) = send(&app, Method::GET, "/favorites?search=apple", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["count"], 2);

    let (status, body) = send(
        &app,
        Method::GET,
        "/favorites?sort_by_name=1&limit=3&page=2",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Cherry Tart"]);
    assert_eq!(body["total"], 4);
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["per_page"], 3);
    assert_eq!(body["last_page"], 2);
    assert_eq!(body["data"][0]["ingredients"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn favorites_are_scoped_to_the_token_owner() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let owner = register_and_login(&app, &unique_email("owner")).await;
    let other = register_and_login(&app, &unique_email("other")).await;
    let ids = seed(&state, &["Paella"]).await;

    let (status, _) = favorite(&app, &owner, ids[0]).await;
    assert_eq!(status, StatusCode::CREATED);

    assert!(!is_favorited(&app, &other, ids[0]).await);
    let (_, body) = send(&app, Method::GET, "/favorites", Some(&other), None).await;
    assert_eq!(body["total"], 0);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/favorites",
        Some(&other),
        Some(json!({ "recipe_id": ids[0] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(is_favorited(&app, &owner, ids[0]).await);
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let Some((app, state)) = db_app(StubProvider::failing()).await else {
        return;
    };
    let token = register_and_login(&app, &unique_email("farpage")).await;
    let ids = seed(&state, &["Gazpacho"]).await;
    let (status, _) = favorite(&app, &token, ids[0]).await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/favorites?page={}&limit=100", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["current_page"], i64::MAX);
    assert_eq!(body["last_page"], 1);
}
