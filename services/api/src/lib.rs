//! Recipe Box API service
//!
//! HTTP API for recipe search, favorites and accounts. Recipe searches are
//! reconciled against an external provider and persisted in PostgreSQL.

pub mod config;
pub mod error;
pub mod favorites;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod provider;
pub mod rate_limiter;
pub mod reconcile;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;

pub use state::AppState;

/// Schema migrations embedded from `migrations/`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
