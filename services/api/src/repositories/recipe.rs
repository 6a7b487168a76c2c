//! Recipe repository: canonical recipe rows and their shared relations

use std::collections::HashMap;

use anyhow::Result;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;

use crate::config::UpsertPolicy;
use crate::models::recipe::{NewIngredient, NewRecipe, RecipeRow};
use crate::models::{Recipe, RecipeIngredient};

const RECIPE_COLUMNS: &str = "id, external_id, title, image, ready_in_minutes, servings, summary, \
                              instructions, source_url, created_at, updated_at";

/// Escape LIKE wildcards so user input matches literally
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(FromRow)]
struct IngredientEdge {
    recipe_id: i64,
    #[sqlx(flatten)]
    ingredient: RecipeIngredient,
}

#[derive(FromRow)]
struct DishTypeEdge {
    recipe_id: i64,
    name: String,
}

/// Attach ingredients and dish types to bare recipe rows, keeping row order
pub(crate) async fn load_relations(pool: &PgPool, rows: Vec<RecipeRow>) -> Result<Vec<Recipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();

    let ingredient_edges = sqlx::query_as::<_, IngredientEdge>(
        r#"
        SELECT ir.recipe_id, i.id, i.external_id, i.name, ir.amount, ir.unit
        FROM ingredient_recipe ir
        JOIN ingredients i ON i.id = ir.ingredient_id
        WHERE ir.recipe_id = ANY($1)
        ORDER BY i.name
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let dish_type_edges = sqlx::query_as::<_, DishTypeEdge>(
        r#"
        SELECT dr.recipe_id, d.name
        FROM dish_type_recipe dr
        JOIN dish_types d ON d.id = dr.dish_type_id
        WHERE dr.recipe_id = ANY($1)
        ORDER BY d.name
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut ingredients: HashMap<i64, Vec<RecipeIngredient>> = HashMap::new();
    for edge in ingredient_edges {
        ingredients
            .entry(edge.recipe_id)
            .or_default()
            .push(edge.ingredient);
    }

    let mut dish_types: HashMap<i64, Vec<String>> = HashMap::new();
    for edge in dish_type_edges {
        dish_types.entry(edge.recipe_id).or_default().push(edge.name);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            row.into_recipe(
                ingredients.remove(&id).unwrap_or_default(),
                dish_types.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

/// Recipe repository for database operations
#[derive(Clone)]
pub struct RecipeRepository {
    pool: PgPool,
}

impl RecipeRepository {
    /// Create a new recipe repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a recipe keyed by its external id, then add its
    /// ingredients and dish types to the join tables. Rows already attached
    /// to the recipe are never detached.
    pub async fn upsert(&self, recipe: &NewRecipe, policy: UpsertPolicy) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let sql = match policy {
            UpsertPolicy::KeepExisting => {
                r#"
                INSERT INTO recipes (external_id, title, image, ready_in_minutes, servings,
                                     summary, instructions, source_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (external_id) DO UPDATE SET external_id = EXCLUDED.external_id
                RETURNING id
                "#
            }
            UpsertPolicy::Refresh => {
                r#"
                INSERT INTO recipes (external_id, title, image, ready_in_minutes, servings,
                                     summary, instructions, source_url)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (external_id) DO UPDATE SET
                title = EXCLUDED.title,
                image = EXCLUDED.image,
                ready_in_minutes = EXCLUDED.ready_in_minutes,
                servings = EXCLUDED.servings,
                summary = EXCLUDED.summary,
                instructions = EXCLUDED.instructions,
                source_url = EXCLUDED.source_url,
                updated_at = NOW()
                RETURNING id
                "#
            }
        };

        let recipe_id: i64 = sqlx::query_scalar(sql)
            .bind(recipe.external_id)
            .bind(&recipe.title)
            .bind(&recipe.image)
            .bind(recipe.ready_in_minutes)
            .bind(recipe.servings)
            .bind(&recipe.summary)
            .bind(&recipe.instructions)
            .bind(&recipe.source_url)
            .fetch_one(&mut *tx)
            .await?;

        for ingredient in &recipe.ingredients {
            let ingredient_id = Self::upsert_ingredient(&mut tx, ingredient).await?;
            Self::attach_ingredient(&mut tx, recipe_id, ingredient_id, ingredient, policy).await?;
        }

        for dish_type in &recipe.dish_types {
            let dish_type_id = Self::upsert_dish_type(&mut tx, dish_type).await?;
            Self::attach_dish_type(&mut tx, recipe_id, dish_type_id).await?;
        }

        tx.commit().await?;

        debug!(
            "Upserted recipe {} (external id {})",
            recipe_id, recipe.external_id
        );
        Ok(recipe_id)
    }

    /// Shared ingredient row, keyed by external id or by name when the
    /// provider sent none
    async fn upsert_ingredient(
        tx: &mut Transaction<'_, Postgres>,
        ingredient: &NewIngredient,
    ) -> Result<i64> {
        let id = match ingredient.external_id {
            Some(external_id) => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO ingredients (external_id, name)
                    VALUES ($1, $2)
                    ON CONFLICT (external_id) DO UPDATE SET external_id = EXCLUDED.external_id
                    RETURNING id
                    "#,
                )
                .bind(external_id)
                .bind(&ingredient.name)
                .fetch_one(&mut **tx)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    r#"
                    INSERT INTO ingredients (name)
                    VALUES ($1)
                    ON CONFLICT (name) WHERE external_id IS NULL
                    DO UPDATE SET name = EXCLUDED.name
                    RETURNING id
                    "#,
                )
                .bind(&ingredient.name)
                .fetch_one(&mut **tx)
                .await?
            }
        };

        Ok(id)
    }

    async fn attach_ingredient(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        ingredient_id: i64,
        ingredient: &NewIngredient,
        policy: UpsertPolicy,
    ) -> Result<()> {
        let sql = match policy {
            UpsertPolicy::KeepExisting => {
                r#"
                INSERT INTO ingredient_recipe (recipe_id, ingredient_id, amount, unit)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (recipe_id, ingredient_id) DO NOTHING
                "#
            }
            UpsertPolicy::Refresh => {
                r#"
                INSERT INTO ingredient_recipe (recipe_id, ingredient_id, amount, unit)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (recipe_id, ingredient_id) DO UPDATE SET
                amount = EXCLUDED.amount,
                unit = EXCLUDED.unit
                "#
            }
        };

        sqlx::query(sql)
            .bind(recipe_id)
            .bind(ingredient_id)
            .bind(ingredient.amount)
            .bind(&ingredient.unit)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    async fn upsert_dish_type(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<i64> {
        let id = sqlx::query_scalar(
            r#"
            INSERT INTO dish_types (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut **tx)
        .await?;

        Ok(id)
    }

    async fn attach_dish_type(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: i64,
        dish_type_id: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dish_type_recipe (recipe_id, dish_type_id)
            VALUES ($1, $2)
            ON CONFLICT (recipe_id, dish_type_id) DO NOTHING
            "#,
        )
        .bind(recipe_id)
        .bind(dish_type_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Load recipes by external id with relations, in the order given
    pub async fn find_by_external_ids(&self, external_ids: &[i64]) -> Result<Vec<Recipe>> {
        if external_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {} FROM recipes WHERE external_id = ANY($1)",
            RECIPE_COLUMNS
        ))
        .bind(external_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_external_id: HashMap<i64, RecipeRow> = rows
            .into_iter()
            .map(|row| (row.external_id, row))
            .collect();

        let ordered = external_ids
            .iter()
            .filter_map(|external_id| by_external_id.remove(external_id))
            .collect();

        load_relations(&self.pool, ordered).await
    }

    /// Local search over persisted recipes: case-insensitive title substring
    /// match, or a random batch when there is no query
    pub async fn search_by_title(&self, query: Option<&str>, limit: i64) -> Result<Vec<Recipe>> {
        let rows = match query {
            Some(term) => {
                sqlx::query_as::<_, RecipeRow>(&format!(
                    "SELECT {} FROM recipes WHERE title ILIKE $1 ORDER BY title, id LIMIT $2",
                    RECIPE_COLUMNS
                ))
                .bind(like_pattern(term))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RecipeRow>(&format!(
                    "SELECT {} FROM recipes ORDER BY RANDOM() LIMIT $1",
                    RECIPE_COLUMNS
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        load_relations(&self.pool, rows).await
    }

    /// Whether a recipe with the given id exists
    pub async fn exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Number of rows stored for an external id (0 or 1)
    pub async fn count_by_external_id(&self, external_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE external_id = $1")
            .bind(external_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("pasta"), "%pasta%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\"), "%c:\\\\%");
    }
}
