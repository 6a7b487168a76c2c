//! Recipe search handler

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::ApiError,
    models::{RecipeQuery, RecipeSearchResponse},
};

/// Search recipes through the reconciliation service
pub async fn search(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<RecipeQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .recipe_service
        .search(query.query.as_deref(), query.limit)
        .await
        .map_err(|e| {
            tracing::error!("Failed to search recipes: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(RecipeSearchResponse {
        status: "success",
        source: outcome.source,
        count: outcome.recipes.len(),
        data: outcome.recipes,
    }))
}
