//! Recipe models for the API service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Canonical recipe record with its relations loaded
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    pub id: i64,
    pub external_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ingredients: Vec<RecipeIngredient>,
    pub dish_types: Vec<String>,
}

/// Recipe row without relations
#[derive(Debug, Clone, FromRow)]
pub struct RecipeRow {
    pub id: i64,
    pub external_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecipeRow {
    pub fn into_recipe(self, ingredients: Vec<RecipeIngredient>, dish_types: Vec<String>) -> Recipe {
        Recipe {
            id: self.id,
            external_id: self.external_id,
            title: self.title,
            image: self.image,
            ready_in_minutes: self.ready_in_minutes,
            servings: self.servings,
            summary: self.summary,
            instructions: self.instructions,
            source_url: self.source_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
            ingredients,
            dish_types,
        }
    }
}

/// Ingredient attached to a recipe, with the per-recipe quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct RecipeIngredient {
    pub id: i64,
    pub external_id: Option<i64>,
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// Where a search response was drawn from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    /// Fresh results from the external provider
    Api,
    /// Local fallback over already persisted recipes
    Database,
}

/// Query parameters for recipe search
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    pub query: Option<String>,
    pub limit: Option<i64>,
}

/// Response for recipe search
#[derive(Debug, Serialize)]
pub struct RecipeSearchResponse {
    pub status: &'static str,
    pub source: RecipeSource,
    pub count: usize,
    pub data: Vec<Recipe>,
}

/// Recipe payload to persist, as normalised from the external provider
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub external_id: i64,
    pub title: String,
    pub image: Option<String>,
    pub ready_in_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    pub ingredients: Vec<NewIngredient>,
    pub dish_types: Vec<String>,
}

/// Ingredient line of a recipe to persist
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub external_id: Option<i64>,
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}
