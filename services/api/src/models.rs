//! API models for persisted entities and request/response payloads

pub mod favorite;
pub mod recipe;
pub mod user;

// Re-export for convenience
pub use favorite::{
    Favorite, FavoriteCheckQuery, FavoriteListQuery, FavoriteListResponse, FavoriteRequest,
};
pub use recipe::{Recipe, RecipeIngredient, RecipeQuery, RecipeSearchResponse, RecipeSource};
pub use user::{
    LoginRequest, LoginResponse, RegisterRequest, Session, UpdateProfileRequest, User,
    UserResponse,
};
