use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Settings for the generative-text service used by plan analysis.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// `None` disables plan analysis; every analyze call then fails.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Falls back to the in-memory store when unset.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub gemini: GeminiConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fitanaliz".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fitanaliz-users".into()),
            ttl_minutes: parse_env("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: parse_env("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
        };
        let port = match std::env::var("APP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("APP_PORT `{raw}` is not a valid port"))?,
            Err(_) => 8080,
        };
        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            database_url,
            jwt,
            gemini,
        })
    }
}

fn parse_env(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}
