//! Advisory on-disk response cache.
//!
//! One file per URL, named by the SHA-256 of the literal URL string and
//! holding the verbatim response body. An entry is served only while its
//! modification age is under `max_age`; there is no revalidation.
//!
//! No locking is done. Two callers missing on the same URL at the same
//! time both go to the network and both write the file; the last write
//! wins. The body for a URL is the same either way, so the only cost is a
//! redundant request. A lock here would be held across a network call.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    max_age: Duration,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_age,
        }
    }

    /// Hex SHA-256 of the URL.
    pub fn key(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn path_for(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(url)))
    }

    /// Return the cached body if a fresh entry exists. Any read problem is
    /// treated as a miss.
    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        let path = self.path_for(url);
        let metadata = tokio::fs::metadata(&path).await.ok()?;
        let modified = metadata.modified().ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        if age >= self.max_age {
            debug!(url = %url, age_secs = age.as_secs(), "Cache entry stale");
            return None;
        }
        match tokio::fs::read(&path).await {
            Ok(body) => {
                debug!(url = %url, path = %path.display(), "Cache hit");
                Some(body)
            }
            Err(e) => {
                warn!(error = ?e, path = %path.display(), "Failed to read cache entry, fetching live");
                None
            }
        }
    }

    pub async fn put(&self, url: &str, body: &[u8]) -> Result<(), FetchError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| FetchError::Io {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.path_for(url);
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| FetchError::Io { path, source })
    }
}
