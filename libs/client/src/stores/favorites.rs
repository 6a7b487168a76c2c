//! Saved recipes of the logged-in user
//!
//! The store remembers which user its state belongs to. Whenever the session
//! user changes, including logout, the saved ids and the loaded page are
//! dropped before anything else happens.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;

use crate::gateway::ApiClient;
use crate::models::{Empty, FavoriteCheck, FavoritePage, FavoriteQuery, Recipe};
use crate::notification::Notifier;
use crate::session::SessionContext;

use super::ActionResult;

#[derive(Debug, Default)]
struct FavoritesState {
    owner: Option<i64>,
    saved: HashSet<i64>,
    page: Option<FavoritePage>,
}

/// Favorites store
#[derive(Clone)]
pub struct FavoritesStore {
    api: ApiClient,
    notifier: Notifier,
    state: Arc<Mutex<FavoritesState>>,
}

impl FavoritesStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: Arc::default(),
        }
    }

    fn session(&self) -> &SessionContext {
        self.api.session()
    }

    /// Lock the state, resetting it if the session user changed
    fn state(&self) -> MutexGuard<'_, FavoritesState> {
        let owner = self.session().user_id();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.owner != owner {
            *state = FavoritesState {
                owner,
                ..FavoritesState::default()
            };
        }
        state
    }

    fn require_login(&self) -> Option<ActionResult> {
        if self.session().is_authenticated() {
            return None;
        }
        self.notifier.warning("Please log in to manage favorites.");
        Some(ActionResult::fail("Please log in to manage favorites."))
    }

    /// Whether the recipe is known to be saved
    pub fn is_saved(&self, recipe_id: i64) -> bool {
        self.state().saved.contains(&recipe_id)
    }

    /// Recipes of the last loaded page
    pub fn list(&self) -> Vec<Recipe> {
        self.state()
            .page
            .as_ref()
            .map(|page| page.data.clone())
            .unwrap_or_default()
    }

    /// Last loaded page, with pagination details
    pub fn page(&self) -> Option<FavoritePage> {
        self.state().page.clone()
    }

    /// Load a page of favorites
    pub async fn refresh(&self, query: &FavoriteQuery) -> ActionResult {
        if let Some(denied) = self.require_login() {
            return denied;
        }
        let owner = self.session().user_id();

        let response = self
            .api
            .get::<FavoritePage>("/favorites", &query.to_params())
            .await;

        match response.data {
            Some(page) if response.success => {
                let mut state = self.state();
                if state.owner != owner {
                    return ActionResult::fail("Session changed.");
                }
                let ids = page.data.iter().map(|recipe| recipe.id);
                // An unfiltered page holding every favorite is the whole saved set
                if query.search_term().is_none() && page.data.len() as i64 >= page.total {
                    state.saved = ids.collect();
                } else {
                    state.saved.extend(ids);
                }
                let message = format!("{} favorites", page.total);
                state.page = Some(page);
                ActionResult::ok(message)
            }
            _ => {
                let result = ActionResult::from_failure(&response);
                self.notifier.error(result.error.clone().unwrap_or_default());
                result
            }
        }
    }

    /// Ask the server whether a recipe is saved and remember the answer
    pub async fn check(&self, recipe_id: i64) -> bool {
        if !self.session().is_authenticated() {
            return false;
        }
        let owner = self.session().user_id();

        let response = self
            .api
            .get::<FavoriteCheck>("/favorites/check", &[("recipe_id", recipe_id.to_string())])
            .await;

        let saved = response.data.map(|check| check.is_favorited).unwrap_or(false);
        let mut state = self.state();
        if state.owner == owner && response.success {
            if saved {
                state.saved.insert(recipe_id);
            } else {
                state.saved.remove(&recipe_id);
            }
        }
        saved
    }

    /// Save the recipe, or unsave it if it is already saved
    pub async fn toggle(&self, recipe_id: i64) -> ActionResult {
        if let Some(denied) = self.require_login() {
            return denied;
        }

        if self.is_saved(recipe_id) {
            self.remove(recipe_id).await
        } else {
            self.add(recipe_id).await
        }
    }

    async fn add(&self, recipe_id: i64) -> ActionResult {
        let owner = self.session().user_id();
        let response = self
            .api
            .post::<Empty, _>("/favorites", &json!({ "recipe_id": recipe_id }))
            .await;

        // A conflict means the server already has it saved
        let saved = response.success || response.status == Some(409);
        if saved {
            let mut state = self.state();
            if state.owner == owner {
                state.saved.insert(recipe_id);
            }
            drop(state);
            self.notifier.success("Recipe saved to favorites.");
            return ActionResult::ok("Recipe saved to favorites.");
        }

        let result = ActionResult::from_failure(&response);
        self.notifier.error(result.error.clone().unwrap_or_default());
        result
    }

    async fn remove(&self, recipe_id: i64) -> ActionResult {
        let owner = self.session().user_id();
        let response = self
            .api
            .delete::<Empty, _>("/favorites", &json!({ "recipe_id": recipe_id }))
            .await;

        // Not found means it is already gone
        let removed = response.success || response.status == Some(404);
        if removed {
            let mut state = self.state();
            if state.owner == owner {
                state.saved.remove(&recipe_id);
                if let Some(page) = state.page.as_mut() {
                    page.data.retain(|recipe| recipe.id != recipe_id);
                }
            }
            drop(state);
            self.notifier.success("Recipe removed from favorites.");
            return ActionResult::ok("Recipe removed from favorites.");
        }

        let result = ActionResult::from_failure(&response);
        self.notifier.error(result.error.clone().unwrap_or_default());
        result
    }
}
