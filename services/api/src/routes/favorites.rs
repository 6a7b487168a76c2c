//! Favorites handlers. The user id always comes from the bearer token.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use crate::{
    AppState,
    error::ApiError,
    favorites::require_recipe_id,
    middleware::AuthUser,
    models::{FavoriteCheckQuery, FavoriteListQuery, FavoriteListResponse, FavoriteRequest},
};

/// Save a recipe to the current user's favorites
pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = require_recipe_id(payload.recipe_id)?;
    let favorite = state.favorite_service.add(user.id, recipe_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Recipe added to favorites",
            "data": favorite,
        })),
    ))
}

/// Remove a recipe from the current user's favorites
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(payload), _): WithRejection<Json<FavoriteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = require_recipe_id(payload.recipe_id)?;
    state.favorite_service.remove(user.id, recipe_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Recipe removed from favorites",
    })))
}

/// Whether the current user saved a recipe
pub async fn check(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<FavoriteCheckQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = require_recipe_id(query.recipe_id)?;
    let is_favorited = state.favorite_service.check(user.id, recipe_id).await?;

    Ok(Json(json!({ "is_favorited": is_favorited })))
}

/// List the current user's favorites with filtering, sorting and pagination
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Query(query), _): WithRejection<Query<FavoriteListQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.favorite_service.list(user.id, &query).await?;

    Ok(Json(FavoriteListResponse {
        status: "success",
        count: page.recipes.len(),
        total: page.total,
        current_page: page.current_page,
        per_page: page.per_page,
        last_page: page.last_page,
        data: page.recipes,
    }))
}
