//! reqwest-backed [`Fetcher`] with the disk cache in front of it.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::cache::DiskCache;
use crate::config::{Credentials, FetchConfig};
use crate::contract::Fetcher;
use crate::error::FetchError;

pub struct HttpFetcher {
    client: Client,
    cache: DiskCache,
    credentials: Option<Credentials>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            cache: DiskCache::new(config.cache_dir.clone(), config.max_age),
            credentials: config.credentials.clone(),
        }
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if let Some(body) = self.cache.get(url).await {
            return Ok(body);
        }

        info!(url = %url, "Fetching");
        let mut request = self.client.get(url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await.map_err(|source| {
            error!(error = ?source, url = %url, "Request failed");
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %url, "Repository returned an error status");
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        if let Err(e) = self.cache.put(url, &body).await {
            warn!(error = %e, url = %url, "Failed to write cache entry");
        } else {
            debug!(url = %url, bytes = body.len(), "Cached response");
        }
        Ok(body)
    }
}
