use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: Url,
    pub supabase_service_key: String,
    pub allowed_origins: Vec<String>,
    pub store_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. `from_env` passes the process environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let supabase_url = require(&lookup, "SUPABASE_URL")?;
        let supabase_url = Url::parse(&supabase_url)
            .with_context(|| format!("SUPABASE_URL '{supabase_url}' is not a valid URL"))?;

        Ok(Config {
            supabase_url,
            supabase_service_key: require(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?,
            allowed_origins: parse_origins(&var_or("ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGIN)),
            store_timeout: Duration::from_secs(
                var_or("STORE_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("STORE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: var_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var_or("RUST_LOG", "info"),
        })
    }
}

fn require(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Splits a comma-separated origin list, dropping blank entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
