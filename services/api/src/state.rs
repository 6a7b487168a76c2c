//! Application state shared across handlers

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;

use crate::{
    config::Settings,
    favorites::FavoriteService,
    jwt::TokenService,
    provider::RecipeProvider,
    rate_limiter::{RateLimiter, RateLimiterConfig},
    reconcile::RecipeService,
    repositories::{FavoriteRepository, RecipeRepository, SessionRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub user_repository: UserRepository,
    pub session_repository: SessionRepository,
    pub recipe_repository: RecipeRepository,
    pub recipe_service: RecipeService,
    pub favorite_service: FavoriteService,
    pub token_service: TokenService,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Wire repositories and services around a pool and a recipe provider
    pub fn new(pool: PgPool, settings: Settings, provider: Arc<dyn RecipeProvider>) -> Result<Self> {
        let token_service = TokenService::new(&settings.jwt)?;
        let rate_limiter = RateLimiter::new(RateLimiterConfig::from(&settings.rate_limit));

        let recipe_repository = RecipeRepository::new(pool.clone());
        let recipe_service = RecipeService::new(
            provider,
            recipe_repository.clone(),
            settings.provider.upsert_policy,
            settings.provider.default_number,
        );
        let favorite_service =
            FavoriteService::new(FavoriteRepository::new(pool.clone()), recipe_repository.clone());

        Ok(Self {
            user_repository: UserRepository::new(pool.clone()),
            session_repository: SessionRepository::new(pool.clone()),
            recipe_repository,
            recipe_service,
            favorite_service,
            token_service,
            rate_limiter,
            settings: Arc::new(settings),
            db_pool: pool,
        })
    }
}
