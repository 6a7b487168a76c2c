//! Recipe search with last-request-wins semantics
//!
//! Every search takes a sequence number when it starts. A response is only
//! applied if its number is still the latest issued, so a slow early search
//! can never overwrite a later one. Debounced searches additionally wait a
//! fixed delay and drop out if another keystroke arrived in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::gateway::ApiClient;
use crate::models::{Recipe, RecipeSource, SearchResults};
use crate::notification::Notifier;

use super::ActionResult;

/// Delay before a debounced search is sent
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Outcome of a search call
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    /// The response was the latest and is now the store's state
    Applied(ActionResult),
    /// A newer search was issued; nothing changed
    Superseded,
}

#[derive(Debug, Default)]
struct RecipeState {
    query: String,
    results: Vec<Recipe>,
    source: Option<RecipeSource>,
    loading: bool,
}

/// Recipe search store
#[derive(Clone)]
pub struct RecipeStore {
    api: ApiClient,
    notifier: Notifier,
    state: Arc<Mutex<RecipeState>>,
    sequence: Arc<AtomicU64>,
    keystrokes: Arc<AtomicU64>,
    debounce: Duration,
    limit: Option<i64>,
}

impl RecipeStore {
    pub fn new(api: ApiClient, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            state: Arc::default(),
            sequence: Arc::new(AtomicU64::new(0)),
            keystrokes: Arc::new(AtomicU64::new(0)),
            debounce: DEBOUNCE_DELAY,
            limit: None,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Number of results to request per search
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn results(&self) -> Vec<Recipe> {
        self.lock().results.clone()
    }

    pub fn source(&self) -> Option<RecipeSource> {
        self.lock().source
    }

    /// Query of the results currently held
    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecipeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_latest(&self, sequence: u64) -> bool {
        self.sequence.load(Ordering::SeqCst) == sequence
    }

    /// Search now. Results are applied only if no newer search was issued
    /// while this one was in flight.
    pub async fn search(&self, query: &str) -> SearchStatus {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().loading = true;

        let mut params = Vec::new();
        let query = query.trim();
        if !query.is_empty() {
            params.push(("query", query.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self.api.get::<SearchResults>("/recipe", &params).await;

        if !self.is_latest(sequence) {
            debug!("Discarding superseded search #{} for {:?}", sequence, query);
            return SearchStatus::Superseded;
        }

        let mut state = self.lock();
        state.loading = false;
        match response.data {
            Some(results) if response.success => {
                let message = format!("Found {} recipes", results.count);
                state.query = query.to_string();
                state.results = results.data;
                state.source = Some(results.source);
                SearchStatus::Applied(ActionResult::ok(message))
            }
            _ => {
                drop(state);
                let result = ActionResult::from_failure(&response);
                self.notifier.error(result.error.clone().unwrap_or_default());
                SearchStatus::Applied(result)
            }
        }
    }

    /// Search after the debounce delay, unless another keystroke arrives first
    pub async fn search_debounced(&self, query: &str) -> SearchStatus {
        let keystroke = self.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;

        if self.keystrokes.load(Ordering::SeqCst) != keystroke {
            return SearchStatus::Superseded;
        }
        self.search(query).await
    }
}
