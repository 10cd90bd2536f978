use std::path::PathBuf;
use thiserror::Error;

/// The sitemap could not be read as a `urlset` document
#[derive(Debug, Error)]
#[error("malformed sitemap: {reason}")]
pub struct MalformedSitemapError {
    pub reason: String,
}

impl MalformedSitemapError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// No configured site profile matched the sitemap content
#[derive(Debug, Error)]
#[error("unknown site: none of [{known}] appears in the sitemap")]
pub struct UnknownSiteError {
    pub known: String,
}

/// Failure to retrieve a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// Retrying cannot change the outcome (e.g. HTTP 404)
    #[error("permanent failure fetching {url}: {reason}")]
    Permanent { url: String, reason: String },

    /// The retry budget was exhausted
    #[error("giving up on {url} after {attempts} attempts: {reason}")]
    Transient {
        url: String,
        attempts: u32,
        reason: String,
    },
}

impl FetchError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, FetchError::Permanent { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            FetchError::Permanent { url, .. } | FetchError::Transient { url, .. } => url,
        }
    }
}

/// Failure reported by the analysis backend
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("analysis backend rejected the request: {0}")]
    Rejected(String),

    #[error("analysis backend unreachable: {0}")]
    Transport(String),

    #[error("analysis backend returned no content")]
    EmptyResponse,

    #[error("could not build analysis request: {0}")]
    InvalidRequest(String),
}

/// A multi-pass analysis could not be completed for a page
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{stage} failed: {source}")]
    Service {
        stage: &'static str,
        #[source]
        source: ServiceError,
    },

    #[error("{stage} returned empty content")]
    EmptyResponse { stage: &'static str },

    #[error("malformed {expected} payload: {source}")]
    MalformedPayload {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Cache persistence failure. Never escalated past the cache itself.
#[derive(Debug, Error)]
pub enum CacheWriteError {
    #[error("could not serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write cache file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingApiKey(&'static str),

    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    UnknownSite(#[from] UnknownSiteError),

    #[error(transparent)]
    Sitemap(#[from] MalformedSitemapError),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("could not serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("could not write results to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
