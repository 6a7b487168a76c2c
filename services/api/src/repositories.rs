//! Repositories for database operations

pub mod favorite;
pub mod recipe;
pub mod session;
pub mod user;

pub use favorite::{FavoriteFilter, FavoriteRepository};
pub use recipe::RecipeRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

/// Whether an error chain bottoms out in a unique-constraint violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|e| e.is_unique_violation())
}
