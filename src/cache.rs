use crate::error::CacheWriteError;
use crate::utils::write_atomic;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// File-per-URL store of previously computed results.
///
/// File names are the URL-safe base64 encoding of the URL, so every entry maps
/// back to its URL. Entries never expire.
#[derive(Debug, Clone)]
pub struct ResultCache {
    root: PathBuf,
}

impl ResultCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache key for a URL
    pub fn key_for(url: &str) -> String {
        URL_SAFE_NO_PAD.encode(url.as_bytes())
    }

    /// Inverse of [`ResultCache::key_for`]
    pub fn url_for_key(key: &str) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(key).ok()?;
        String::from_utf8(bytes).ok()
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::key_for(url)))
    }

    /// Looks up a payload. Missing or undecodable entries are misses.
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        let path = self.path_for(url);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(_) => {
                ::log::trace!("Cache miss for {}", url);
                return None;
            }
        };

        match serde_json::from_slice(&data) {
            Ok(payload) => {
                ::log::debug!("Cache hit for {}", url);
                Some(payload)
            }
            Err(e) => {
                ::log::debug!("Ignoring undecodable cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Stores a payload. Failures are logged and swallowed.
    pub async fn set<T: Serialize>(&self, url: &str, payload: &T) {
        if let Err(e) = self.try_set(url, payload).await {
            ::log::warn!("Cache write error for {}: {}", url, e);
        }
    }

    async fn try_set<T: Serialize>(&self, url: &str, payload: &T) -> Result<(), CacheWriteError> {
        let data = serde_json::to_vec(payload)?;
        write_atomic(&self.path_for(url), &data).await?;
        Ok(())
    }
}
