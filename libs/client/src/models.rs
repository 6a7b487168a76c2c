//! Payloads exchanged with the Recipe Box API

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Public user profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// Canonical recipe as persisted by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub dish_types: Vec<String>,
}

/// Where search results came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeSource {
    Api,
    Database,
}

/// `GET /recipe` answer
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub source: RecipeSource,
    pub count: usize,
    pub data: Vec<Recipe>,
}

/// `POST /auth/login` answer
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub user: User,
    pub token: String,
}

/// Answers carrying a user profile
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub user: User,
}

/// Answers with no data of interest
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Empty {}

/// `GET /favorites/check` answer
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteCheck {
    pub is_favorited: bool,
}

/// `GET /favorites` answer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FavoritePage {
    pub count: usize,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
    pub data: Vec<Recipe>,
}

/// Registration form
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Profile form; `password` is the current password, required with `new_password`
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

/// Favorites listing options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoriteQuery {
    pub search: Option<String>,
    pub sort_by_name: bool,
    pub limit: Option<i64>,
    pub page: Option<i64>,
}

impl FavoriteQuery {
    /// Search text, unless blank
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = self.search_term() {
            params.push(("search", search.to_string()));
        }
        if self.sort_by_name {
            params.push(("sort_by_name", "true".to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        params
    }
}

/// Per-field validation messages
pub type FieldErrors = BTreeMap<String, Vec<String>>;
