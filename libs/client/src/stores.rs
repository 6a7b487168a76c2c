//! Client-side stores
//!
//! Stores call the gateway, update their own state and report back with an
//! [`ActionResult`]; failures surface as notifications, never as errors.

pub mod auth;
pub mod favorites;
pub mod recipes;

pub use auth::AuthStore;
pub use favorites::FavoritesStore;
pub use recipes::{RecipeStore, SearchStatus};

use crate::gateway::ApiResponse;
use crate::models::FieldErrors;

/// Uniform outcome of a store action
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionResult {
    pub success: bool,
    pub message: Option<String>,
    pub error: Option<String>,
    pub errors: FieldErrors,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Failure carrying the gateway's error details
    pub(crate) fn from_failure<T>(response: &ApiResponse<T>) -> Self {
        Self {
            success: false,
            message: None,
            error: response
                .first_error()
                .map(str::to_string)
                .or_else(|| Some("Something went wrong.".to_string())),
            errors: response.errors.clone(),
        }
    }
}
