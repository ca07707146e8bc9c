use anyhow::{Context, Result};

use crate::matching::weights::WeightTable;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// `SKILL_WEIGHTS` override of the built-in default weights, if set.
    pub skill_weights: Option<WeightTable>,
    pub clamp_score: bool,
    pub frequency_boost: bool,
    pub feedback_top_matched: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let skill_weights = match std::env::var("SKILL_WEIGHTS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                WeightTable::parse_list(&raw)
                    .context("SKILL_WEIGHTS must be a comma-separated list of skill=weight")?,
            ),
            _ => None,
        };

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            skill_weights,
            clamp_score: parse_env("CLAMP_SCORE", false)?,
            frequency_boost: parse_env("FREQUENCY_BOOST", true)?,
            feedback_top_matched: parse_env("FEEDBACK_TOP_MATCHED", 5)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        _ => Ok(default),
    }
}
