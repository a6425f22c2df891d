//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (existing
//! variables win), then every setting falls back to a default.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONTEXT_FILES: usize = 30;
pub const DEFAULT_CONTEXT_CHARS: usize = 3000;
pub const DEFAULT_LOG_FILTER: &str = "codeforge=debug,codeforge_lib=debug,info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    /// Max files included as codebase context in assistant prompts.
    pub context_files: usize,
    /// Per-file excerpt length, in characters.
    pub context_chars: usize,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig {
                api_key: None,
                model: DEFAULT_MODEL.to_string(),
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            },
            context_files: DEFAULT_CONTEXT_FILES,
            context_chars: DEFAULT_CONTEXT_CHARS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let timeout_secs = parse_number(get("CODEFORGE_TIMEOUT_SECS"), "CODEFORGE_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            oracle: OracleConfig {
                api_key: get("OPENAI_API_KEY"),
                model: get("OPENAI_MODEL").unwrap_or(defaults.oracle.model),
                base_url: get("OPENAI_BASE_URL").unwrap_or(defaults.oracle.base_url),
                timeout: Duration::from_secs(timeout_secs),
            },
            context_files: parse_number(get("CODEFORGE_CONTEXT_FILES"), "CODEFORGE_CONTEXT_FILES")?
                .unwrap_or(defaults.context_files),
            context_chars: parse_number(get("CODEFORGE_CONTEXT_CHARS"), "CODEFORGE_CONTEXT_CHARS")?
                .unwrap_or(defaults.context_chars),
            log_filter: get("CODEFORGE_LOG")
                .or_else(|| get("RUST_LOG"))
                .unwrap_or(defaults.log_filter),
        })
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}
