use log::{info, warn};
use std::{env, fmt::Display, str::FromStr};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Runtime settings read from the environment (and `.env`, when present)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub bind_address: String,
    pub port: u16,
    pub database_path: String,
}

impl AppConfig {
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            gemini_api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            gemini_model: load_or(&lookup, "GEMINI_MODEL", DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: load_or(
                &lookup,
                "GEMINI_BASE_URL",
                DEFAULT_GEMINI_BASE_URL.to_string(),
            ),
            bind_address: load_or(&lookup, "BIND_ADDRESS", "127.0.0.1".to_string()),
            port: load_or(&lookup, "PORT", 8000),
            database_path: load_or(
                &lookup,
                "DATABASE_PATH",
                crate::database_factory::DEFAULT_DATABASE_PATH.to_string(),
            ),
        }
    }
}

fn load_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
    }
}
