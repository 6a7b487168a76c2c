//! Favorites service: a user's saved recipes

use tracing::{error, info};

use crate::error::{ApiError, ApiResult, ValidationErrors};
use crate::models::{Favorite, FavoriteListQuery, Recipe};
use crate::repositories::{FavoriteFilter, FavoriteRepository, RecipeRepository};

/// Default page size for favorites listing
pub const DEFAULT_PER_PAGE: i64 = 10;
/// Largest accepted page size
pub const MAX_PER_PAGE: i64 = 100;

impl From<&FavoriteListQuery> for FavoriteFilter {
    fn from(query: &FavoriteListQuery) -> Self {
        Self {
            search: query
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            sort_by_name: query.sort_by_name,
            page: query.page.unwrap_or(1).max(1),
            limit: query.limit.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }
}

/// Number of the last page, never below 1
pub fn last_page(total: i64, per_page: i64) -> i64 {
    if total <= 0 || per_page <= 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    }
}

/// A page of favorites
#[derive(Debug)]
pub struct FavoritePage {
    pub recipes: Vec<Recipe>,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
}

/// Reject a missing recipe id with a field error
pub fn require_recipe_id(recipe_id: Option<i64>) -> ApiResult<i64> {
    recipe_id.ok_or_else(|| {
        ApiError::Validation(ValidationErrors::single(
            "recipe_id",
            "The recipe id field is required.",
        ))
    })
}

fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!("{}: {}", context, e);
        ApiError::InternalServerError
    }
}

/// Favorites service
#[derive(Clone)]
pub struct FavoriteService {
    favorites: FavoriteRepository,
    recipes: RecipeRepository,
}

impl FavoriteService {
    pub fn new(favorites: FavoriteRepository, recipes: RecipeRepository) -> Self {
        Self { favorites, recipes }
    }

    /// Save a recipe for the user
    pub async fn add(&self, user_id: i64, recipe_id: i64) -> ApiResult<Favorite> {
        let exists = self
            .recipes
            .exists(recipe_id)
            .await
            .map_err(internal("Failed to look up recipe"))?;
        if !exists {
            return Err(ApiError::Validation(ValidationErrors::single(
                "recipe_id",
                "The selected recipe id is invalid.",
            )));
        }

        let favorite = self
            .favorites
            .add(user_id, recipe_id)
            .await
            .map_err(internal("Failed to add favorite"))?
            .ok_or_else(|| ApiError::Conflict("Recipe is already in favorites".to_string()))?;

        info!("User {} saved recipe {}", user_id, recipe_id);
        Ok(favorite)
    }

    /// Remove a saved recipe
    pub async fn remove(&self, user_id: i64, recipe_id: i64) -> ApiResult<()> {
        let removed = self
            .favorites
            .remove(user_id, recipe_id)
            .await
            .map_err(internal("Failed to remove favorite"))?;

        if !removed {
            return Err(ApiError::NotFound("Favorite not found".to_string()));
        }

        info!("User {} removed recipe {}", user_id, recipe_id);
        Ok(())
    }

    /// Whether the user saved the recipe
    pub async fn check(&self, user_id: i64, recipe_id: i64) -> ApiResult<bool> {
        self.favorites
            .exists(user_id, recipe_id)
            .await
            .map_err(internal("Failed to check favorite"))
    }

    /// One page of the user's saved recipes
    pub async fn list(&self, user_id: i64, query: &FavoriteListQuery) -> ApiResult<FavoritePage> {
        let filter = FavoriteFilter::from(query);
        let (recipes, total) = self
            .favorites
            .list(user_id, &filter)
            .await
            .map_err(internal("Failed to list favorites"))?;

        Ok(FavoritePage {
            recipes,
            total,
            current_page: filter.page,
            per_page: filter.limit,
            last_page: last_page(total, filter.limit),
        })
    }
}
