//! Favorite repository. Every query is scoped by the owning user id.

use anyhow::Result;
use sqlx::PgPool;

use super::recipe::{like_pattern, load_relations};
use crate::models::Favorite;
use crate::models::Recipe;
use crate::models::recipe::RecipeRow;

/// Normalised listing parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteFilter {
    pub search: Option<String>,
    pub sort_by_name: bool,
    pub page: i64,
    pub limit: i64,
}

impl FavoriteFilter {
    /// Rows to skip; saturates so huge page numbers yield an empty page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Favorite repository for database operations
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new favorite repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the (user, recipe) pair. Returns `None` when it already exists.
    pub async fn add(&self, user_id: i64, recipe_id: i64) -> Result<Option<Favorite>> {
        let favorite = sqlx::query_as::<_, Favorite>(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            RETURNING id, user_id, recipe_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(favorite)
    }

    /// Delete the (user, recipe) pair, reporting whether it existed
    pub async fn remove(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2")
            .bind(user_id)
            .bind(recipe_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether the user has saved the recipe
    pub async fn exists(&self, user_id: i64, recipe_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2)",
        )
        .bind(user_id)
        .bind(recipe_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// One page of the user's saved recipes and the total matching count
    pub async fn list(&self, user_id: i64, filter: &FavoriteFilter) -> Result<(Vec<Recipe>, i64)> {
        let pattern = filter.search.as_deref().map(like_pattern);

        let order = if filter.sort_by_name {
            "r.title ASC, r.id ASC"
        } else {
            "f.created_at DESC, f.id DESC"
        };

        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            r#"
            SELECT r.id, r.external_id, r.title, r.image, r.ready_in_minutes, r.servings,
                   r.summary, r.instructions, r.source_url, r.created_at, r.updated_at
            FROM favorites f
            JOIN recipes r ON r.id = f.recipe_id
            WHERE f.user_id = $1 AND ($2::TEXT IS NULL OR r.title ILIKE $2)
            ORDER BY {}
            LIMIT $3 OFFSET $4
            "#,
            order
        ))
        .bind(user_id)
        .bind(&pattern)
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM favorites f
            JOIN recipes r ON r.id = f.recipe_id
            WHERE f.user_id = $1 AND ($2::TEXT IS NULL OR r.title ILIKE $2)
            "#,
        )
        .bind(user_id)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let recipes = load_relations(&self.pool, rows).await?;
        Ok((recipes, total))
    }
}
