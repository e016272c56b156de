use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Every integration is optional: a missing key disables the feature it
/// backs and the service keeps running.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
    pub model_path: String,
    pub label_encoder_path: String,
    pub static_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            supabase_url: optional_env("SUPABASE_URL"),
            supabase_key: optional_env("SUPABASE_KEY"),
            database_url: optional_env("DATABASE_URL"),
            model_path: optional_env("MODEL_PATH").unwrap_or_else(|| "model.json".to_string()),
            label_encoder_path: optional_env("LABEL_ENCODER_PATH")
                .unwrap_or_else(|| "label_encoder.json".to_string()),
            static_dir: optional_env("STATIC_DIR").unwrap_or_else(|| "static".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Supabase credentials, only when both halves are present.
    pub fn supabase(&self) -> Option<(&str, &str)> {
        match (&self.supabase_url, &self.supabase_key) {
            (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// Reads an env var, treating empty or whitespace-only values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
