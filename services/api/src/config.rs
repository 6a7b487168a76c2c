//! Layered service settings
//!
//! Values are resolved from built-in defaults, then the optional
//! `config/default.toml` file, then `APP_*` environment variables
//! (`APP_SERVER__PORT=8080`, `APP_PROVIDER__API_KEY=...`).

use std::net::SocketAddr;

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Bearer token settings
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// HMAC secret used to sign tokens
    pub secret: String,
    /// Token lifetime in seconds
    pub token_expiry: u64,
}

/// How a repeat sighting of a known external recipe is stored
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum UpsertPolicy {
    /// First write wins; later provider payloads leave the row untouched
    #[serde(rename = "keep")]
    KeepExisting,
    /// Provider payloads overwrite the descriptive fields of the row
    #[serde(rename = "refresh")]
    Refresh,
}

/// External recipe provider settings
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    /// Result count used when a search does not ask for one
    pub default_number: i64,
    pub timeout_seconds: u64,
    pub upsert_policy: UpsertPolicy,
}

/// Login throttling settings
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSettings {
    pub max_attempts: u32,
    pub window_seconds: u64,
    pub ban_duration_seconds: u64,
}

/// Service settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub jwt: JwtSettings,
    pub provider: ProviderSettings,
    pub rate_limit: RateLimitSettings,
}

impl Settings {
    /// Load settings from defaults, `config/default.toml` and the environment
    pub fn load() -> Result<Self> {
        Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to deserialize settings")
    }

    /// Built-in defaults, also used directly by tests
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("jwt.secret", "change-me-in-production")?
            .set_default("jwt.token_expiry", 604_800)?
            .set_default("provider.base_url", "https://api.spoonacular.com")?
            .set_default("provider.api_key", "")?
            .set_default("provider.default_number", 10)?
            .set_default("provider.timeout_seconds", 10)?
            .set_default("provider.upsert_policy", "refresh")?
            .set_default("rate_limit.max_attempts", 5)?
            .set_default("rate_limit.window_seconds", 300)?
            .set_default("rate_limit.ban_duration_seconds", 3600)?;
        Ok(builder)
    }

    /// Settings built from the defaults alone
    pub fn from_defaults() -> Result<Self> {
        Ok(Self::defaults()?.build()?.try_deserialize()?)
    }

    /// Address the HTTP listener binds to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| {
                format!(
                    "Invalid listen address {}:{}",
                    self.server.host, self.server.port
                )
            })
    }
}
