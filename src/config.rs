use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MAX_CONCURRENCY_VAR: &str = "MAX_CONCURRENT_REQUESTS";
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_MS";

/// Settings for an analysis run, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Credential for the analysis backend
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Maximum number of pages fetched and analyzed at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-request timeout for page fetches
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Model used by the analysis backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Where analysis results are cached; `None` disables caching
    #[serde(default = "default_cache_dir")]
    pub cache_dir: Option<PathBuf>,

    /// Characters of page text included in analysis prompts
    #[serde(default = "default_content_limit")]
    pub content_limit: usize,

    /// Market named in the regional analysis pass
    #[serde(default = "default_market_region")]
    pub market_region: String,

    /// User agent sent with page fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_concurrency() -> usize {
    5
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_cache_dir() -> Option<PathBuf> {
    Some(PathBuf::from(".cache"))
}

fn default_content_limit() -> usize {
    2000
}

fn default_market_region() -> String {
    "German and European".to_string()
}

fn default_user_agent() -> String {
    concat!("sitemap-insight/", env!("CARGO_PKG_VERSION")).to_string()
}

impl AnalyzerConfig {
    /// Create a configuration with default values
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(API_KEY_VAR));
        }
        Ok(Self {
            api_key,
            max_concurrency: default_max_concurrency(),
            request_timeout_ms: default_request_timeout_ms(),
            model: default_model(),
            cache_dir: default_cache_dir(),
            content_limit: default_content_limit(),
            market_region: default_market_region(),
            user_agent: default_user_agent(),
        })
    }

    /// Load from `OPENAI_API_KEY`, `MAX_CONCURRENT_REQUESTS` and `REQUEST_TIMEOUT_MS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AnalyzerConfig::from_env`] with a caller-supplied variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new(lookup(API_KEY_VAR).unwrap_or_default())?;
        config.apply_overrides(&lookup);
        Ok(config)
    }

    /// Load from a JSON file. A key missing from the file is taken from the environment.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.api_key.trim().is_empty() {
            config.api_key = std::env::var(API_KEY_VAR)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;
        }
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(n) = positive_number(lookup, MAX_CONCURRENCY_VAR) {
            self.max_concurrency = n as usize;
        }
        if let Some(ms) = positive_number(lookup, REQUEST_TIMEOUT_VAR) {
            self.request_timeout_ms = ms;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Zero or unparsable values leave the default in place
fn positive_number(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            ::log::warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
