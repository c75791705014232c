//! Application configuration.
//!
//! Loads settings from environment variables into a single struct that is
//! passed through the rest of the service.

use std::env;
use tracing::Level;

use prepmate_core::clock::{DEFAULT_ANSWER_SECS, DEFAULT_SESSION_SECS};
use prepmate_core::generate::DEFAULT_MODEL;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub model: String,
    pub log_level: Level,
    pub session_secs: u32,
    pub answer_secs: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidNumber(String, String),
}

fn seconds_var(name: &str, unit_secs: u32, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u32>()
            .map(|n| n * unit_secs)
            .map_err(|_| ConfigError::InvalidNumber(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `GEMINI_API_KEY`: Your secret key for the Gemini API. Required; there is no fallback credential.
    // *   `GEMINI_MODEL`: (Optional) The generation model. Defaults to "gemini-2.5-pro".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    // *   `SESSION_MINUTES`: (Optional) Overall session ceiling in minutes. Defaults to 20.
    // *   `ANSWER_SECONDS`: (Optional) Per-answer ceiling in seconds. Defaults to 120.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. Useful for local development, ignored if not present.
        dotenvy::dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("GEMINI_API_KEY".to_string()))?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        let session_secs = seconds_var("SESSION_MINUTES", 60, DEFAULT_SESSION_SECS)?;
        let answer_secs = seconds_var("ANSWER_SECONDS", 1, DEFAULT_ANSWER_SECS)?;

        Ok(Self {
            gemini_api_key,
            model,
            log_level,
            session_secs,
            answer_secs,
        })
    }
}
