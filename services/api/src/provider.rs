//! External recipe provider client
//!
//! Talks to a Spoonacular-compatible API: `recipes/complexSearch` for
//! free-text searches with enriched records and `recipes/random` for a random
//! batch. The provider is treated as unreliable; callers decide how to
//! recover from a [`ProviderError`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::models::recipe::{NewIngredient, NewRecipe};

/// Errors raised while talking to the provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network, timeout or body decoding failure
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned status {0}")]
    Status(u16),
}

/// Recipe as returned by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRecipe {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub image: Option<String>,
    pub ready_in_minutes: Option<i32>,
    pub servings: Option<i32>,
    pub summary: Option<String>,
    pub instructions: Option<String>,
    pub source_url: Option<String>,
    pub extended_ingredients: Option<Vec<ProviderIngredient>>,
    pub dish_types: Option<Vec<String>>,
}

/// Ingredient line as returned by the provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderIngredient {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl From<ProviderRecipe> for NewRecipe {
    fn from(recipe: ProviderRecipe) -> Self {
        let ingredients = recipe
            .extended_ingredients
            .unwrap_or_default()
            .into_iter()
            .filter_map(|ingredient| {
                let name = non_empty(ingredient.name).or(non_empty(ingredient.original_name))?;
                Some(NewIngredient {
                    // Provider uses non-positive ids for unknown ingredients
                    external_id: ingredient.id.filter(|id| *id > 0),
                    name: name.to_lowercase(),
                    amount: ingredient.amount,
                    unit: non_empty(ingredient.unit),
                })
            })
            .collect();

        let mut dish_types: Vec<String> = recipe
            .dish_types
            .unwrap_or_default()
            .into_iter()
            .map(|d| d.trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        dish_types.sort();
        dish_types.dedup();

        Self {
            external_id: recipe.id,
            title: non_empty(recipe.title).unwrap_or_else(|| format!("Recipe {}", recipe.id)),
            image: non_empty(recipe.image),
            ready_in_minutes: recipe.ready_in_minutes,
            servings: recipe.servings,
            summary: non_empty(recipe.summary),
            instructions: non_empty(recipe.instructions),
            source_url: non_empty(recipe.source_url),
            ingredients,
            dish_types,
        }
    }
}

/// Source of external recipes
#[async_trait]
pub trait RecipeProvider: Send + Sync {
    /// Full-text search returning enriched records
    async fn search(&self, query: &str, number: i64) -> Result<Vec<ProviderRecipe>, ProviderError>;

    /// A random batch of recipes
    async fn random(&self, number: i64) -> Result<Vec<ProviderRecipe>, ProviderError>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ProviderRecipe>,
}

#[derive(Deserialize)]
struct RandomResponse {
    #[serde(default)]
    recipes: Vec<ProviderRecipe>,
}

/// Spoonacular HTTP client
#[derive(Clone)]
pub struct SpoonacularProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SpoonacularProvider {
    /// Build a client from settings
    pub fn new(settings: &ProviderSettings) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Calling recipe provider: {}", url);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecipeProvider for SpoonacularProvider {
    async fn search(&self, query: &str, number: i64) -> Result<Vec<ProviderRecipe>, ProviderError> {
        let response: SearchResponse = self
            .get(
                "/recipes/complexSearch",
                &[
                    ("query", query.to_string()),
                    ("number", number.to_string()),
                    ("addRecipeInformation", "true".to_string()),
                    ("fillIngredients", "true".to_string()),
                ],
            )
            .await?;

        Ok(response.results)
    }

    async fn random(&self, number: i64) -> Result<Vec<ProviderRecipe>, ProviderError> {
        let response: RandomResponse = self
            .get("/recipes/random", &[("number", number.to_string())])
            .await?;

        Ok(response.recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpsertPolicy;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use serde_json::json;
    use std::collections::HashMap;

    fn sample_recipe() -> serde_json::Value {
        json!({
            "id": 715538,
            "title": "  Bruschetta Style Pork & Pasta ",
            "image": "https://img.example/715538.jpg",
            "readyInMinutes": 35,
            "servings": 5,
            "summary": "A <b>quick</b> dinner.",
            "instructions": "",
            "sourceUrl": "https://example.com/bruschetta",
            "dishTypes": ["Dinner", "main course", "dinner"],
            "extendedIngredients": [
                {"id": 20420, "name": "Pasta", "amount": 1.5, "unit": "cups"},
                {"id": -1, "name": "", "originalName": "Sea Salt", "amount": 1.0, "unit": ""},
                {"id": 1, "amount": 2.0}
            ]
        })
    }

    async fn spawn_fake(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(base_url: String) -> SpoonacularProvider {
        SpoonacularProvider::new(&ProviderSettings {
            base_url,
            api_key: "test-key".to_string(),
            default_number: 10,
            timeout_seconds: 5,
            upsert_policy: UpsertPolicy::Refresh,
        })
        .unwrap()
    }

    #[test]
    fn test_normalises_provider_payload() {
        let recipe: ProviderRecipe = serde_json::from_value(sample_recipe()).unwrap();
        let new_recipe = NewRecipe::from(recipe);

        assert_eq!(new_recipe.external_id, 715538);
        assert_eq!(new_recipe.title, "Bruschetta Style Pork & Pasta");
        assert_eq!(new_recipe.instructions, None);
        assert_eq!(new_recipe.dish_types, vec!["dinner", "main course"]);
        assert_eq!(new_recipe.ingredients.len(), 2);
        assert_eq!(new_recipe.ingredients[0].external_id, Some(20420));
        assert_eq!(new_recipe.ingredients[0].name, "pasta");
        assert_eq!(new_recipe.ingredients[1].external_id, None);
        assert_eq!(new_recipe.ingredients[1].name, "sea salt");
        assert_eq!(new_recipe.ingredients[1].unit, None);
    }

    #[test]
    fn test_tolerates_sparse_records() {
        let recipe: ProviderRecipe =
            serde_json::from_value(json!({"id": 9, "dishTypes": null})).unwrap();
        let new_recipe = NewRecipe::from(recipe);
        assert_eq!(new_recipe.title, "Recipe 9");
        assert!(new_recipe.ingredients.is_empty());
        assert!(new_recipe.dish_types.is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_enrichment_parameters() {
        let router = Router::new().route(
            "/recipes/complexSearch",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("query").map(String::as_str), Some("pasta"));
                assert_eq!(params.get("number").map(String::as_str), Some("3"));
                assert_eq!(
                    params.get("addRecipeInformation").map(String::as_str),
                    Some("true")
                );
                assert_eq!(params.get("fillIngredients").map(String::as_str), Some("true"));
                assert_eq!(params.get("apiKey").map(String::as_str), Some("test-key"));
                Json(json!({"results": [sample_recipe()], "totalResults": 1}))
            }),
        );
        let base_url = spawn_fake(router).await;

        let results = provider(base_url).search("pasta", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 715538);
    }

    #[tokio::test]
    async fn test_random_reads_recipes_envelope() {
        let router = Router::new().route(
            "/recipes/random",
            get(|| async { Json(json!({"recipes": [sample_recipe(), {"id": 2}]})) }),
        );
        let base_url = spawn_fake(router).await;

        let results = provider(format!("{}/", base_url)).random(2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].id, 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let router = Router::new().route(
            "/recipes/complexSearch",
            get(|| async { (StatusCode::PAYMENT_REQUIRED, "quota exceeded") }),
        );
        let base_url = spawn_fake(router).await;

        let err = provider(base_url).search("pasta", 3).await.unwrap_err();
        assert!(matches!(err, ProviderError::Status(402)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(format!("http://{}", addr))
            .random(1)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
