//! Favorite models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use super::recipe::Recipe;

/// Join record linking a user to a saved recipe
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub recipe_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Body for adding or removing a favorite
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRequest {
    pub recipe_id: Option<i64>,
}

/// Query for `GET /favorites/check`
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteCheckQuery {
    pub recipe_id: Option<i64>,
}

/// Query parameters for favorites listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteListQuery {
    /// Case-insensitive title filter
    pub search: Option<String>,
    /// Sort by title instead of most recently favorited
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub sort_by_name: bool,
    /// Number of items per page
    pub limit: Option<i64>,
    /// Page number (1-based)
    pub page: Option<i64>,
}

/// Response for favorites listing with pagination
#[derive(Debug, Serialize)]
pub struct FavoriteListResponse {
    pub status: &'static str,
    pub count: usize,
    pub total: i64,
    pub current_page: i64,
    pub per_page: i64,
    pub last_page: i64,
    pub data: Vec<Recipe>,
}

/// Accepts `true`/`false`/`1`/`0`/`yes`/`no`/`on`/`off` and empty values, the
/// way browsers and query builders send checkbox toggles.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim).map(str::to_ascii_lowercase).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid boolean flag: {}",
            other
        ))),
    }
}
