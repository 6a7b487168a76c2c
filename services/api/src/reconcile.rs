//! Recipe reconciliation
//!
//! Merges provider results into canonical storage and always answers with
//! persisted, relation-complete rows. When the provider fails or has nothing
//! to offer, the search falls back to recipes already stored locally. A
//! provider record that cannot be stored is skipped.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::config::UpsertPolicy;
use crate::models::recipe::NewRecipe;
use crate::models::{Recipe, RecipeSource};
use crate::provider::RecipeProvider;
use crate::repositories::RecipeRepository;

/// Upper bound on the number of results a single search may request
pub const MAX_LIMIT: i64 = 100;

/// Result of a reconciled search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub source: RecipeSource,
    pub recipes: Vec<Recipe>,
}

/// Blank queries count as no query
pub fn normalize_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

/// Clamp a requested result count into `1..=MAX_LIMIT`
pub fn clamp_limit(limit: Option<i64>, default: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, MAX_LIMIT)
}

/// Recipe reconciliation service
#[derive(Clone)]
pub struct RecipeService {
    provider: Arc<dyn RecipeProvider>,
    recipes: RecipeRepository,
    policy: UpsertPolicy,
    default_limit: i64,
}

impl RecipeService {
    pub fn new(
        provider: Arc<dyn RecipeProvider>,
        recipes: RecipeRepository,
        policy: UpsertPolicy,
        default_limit: i64,
    ) -> Self {
        Self {
            provider,
            recipes,
            policy,
            default_limit,
        }
    }

    /// Search the provider and reconcile its results into storage, falling
    /// back to a local title search. Only a failing local query is an error.
    pub async fn search(&self, query: Option<&str>, limit: Option<i64>) -> Result<SearchOutcome> {
        let query = normalize_query(query);
        let limit = clamp_limit(limit, self.default_limit);

        let fetched = match query {
            Some(q) => self.provider.search(q, limit).await,
            None => self.provider.random(limit).await,
        };

        let items = match fetched {
            Ok(items) if !items.is_empty() => items,
            Ok(_) => {
                info!("Recipe provider returned no results, searching locally");
                return self.local_search(query, limit).await;
            }
            Err(e) => {
                warn!("Recipe provider failed, searching locally: {}", e);
                return self.local_search(query, limit).await;
            }
        };

        let mut seen = Vec::with_capacity(items.len());
        let mut external_ids = Vec::with_capacity(items.len());
        for item in items.into_iter().take(limit as usize) {
            let recipe = NewRecipe::from(item);
            if seen.contains(&recipe.external_id) {
                continue;
            }
            seen.push(recipe.external_id);

            match self.recipes.upsert(&recipe, self.policy).await {
                Ok(_) => external_ids.push(recipe.external_id),
                Err(e) => warn!("Skipping provider recipe {}: {}", recipe.external_id, e),
            }
        }

        if external_ids.is_empty() {
            warn!("No provider recipe could be stored, searching locally");
            return self.local_search(query, limit).await;
        }

        let recipes = self.recipes.find_by_external_ids(&external_ids).await?;
        info!("Reconciled {} recipes from provider", recipes.len());

        Ok(SearchOutcome {
            source: RecipeSource::Api,
            recipes,
        })
    }

    async fn local_search(&self, query: Option<&str>, limit: i64) -> Result<SearchOutcome> {
        let recipes = self.recipes.search_by_title(query, limit).await?;
        Ok(SearchOutcome {
            source: RecipeSource::Database,
            recipes,
        })
    }
}
