//! Cache warming: request every URL from a listing endpoint so the
//! downstream image server has them cached.
//!
//! A fixed pool of workers drains one shared queue. Each URL gets its own
//! timeout; a failure or timeout is logged and the worker moves on. The
//! pool is fully joined before the report is returned.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info};

use crate::error::FetchError;

pub const DEFAULT_WORKERS: usize = 2;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Deserialize)]
struct UrlItem {
    #[serde(default)]
    url: String,
}

/// Fetch the `[{"url": ...}]` listing. Empty URLs are dropped.
pub async fn fetch_url_list(client: &Client, endpoint: &str) -> Result<Vec<String>, FetchError> {
    let transport = |source| FetchError::Transport {
        url: endpoint.to_string(),
        source,
    };
    let response = client.get(endpoint).send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: endpoint.to_string(),
            status: status.as_u16(),
        });
    }
    let items: Vec<UrlItem> = response.json().await.map_err(transport)?;
    Ok(items
        .into_iter()
        .map(|i| i.url)
        .filter(|u| !u.is_empty())
        .collect())
}

pub async fn warm_urls(
    client: &Client,
    urls: Vec<String>,
    workers: usize,
    timeout: Duration,
) -> WarmReport {
    let attempted = urls.len();
    let (tx, rx) = mpsc::channel::<String>(attempted.max(1));
    for url in urls {
        // Capacity covers every URL, so this never waits.
        if tx.send(url).await.is_err() {
            break;
        }
    }
    drop(tx);

    let rx = Arc::new(Mutex::new(rx));
    let handles = (1..=workers.max(1)).map(|worker| {
        let rx = Arc::clone(&rx);
        let client = client.clone();
        tokio::spawn(async move {
            let mut succeeded = 0usize;
            loop {
                let next = rx.lock().await.recv().await;
                let Some(url) = next else { break };
                match tokio::time::timeout(timeout, warm_one(&client, &url)).await {
                    Ok(Ok(())) => {
                        debug!(worker, url = %url, "Warmed");
                        succeeded += 1;
                    }
                    Ok(Err(e)) => error!(worker, url = %url, error = %e, "Worker failed"),
                    Err(_) => error!(worker, url = %url, timeout_secs = timeout.as_secs(), "Worker timed out"),
                }
            }
            succeeded
        })
    });

    let succeeded = join_all(handles)
        .await
        .into_iter()
        .map(|joined| match joined {
            Ok(n) => n,
            Err(e) => {
                error!(error = ?e, "Warm worker panicked");
                0
            }
        })
        .sum::<usize>();

    let report = WarmReport {
        attempted,
        succeeded,
        failed: attempted - succeeded,
    };
    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        "Cache warm complete"
    );
    report
}

async fn warm_one(client: &Client, url: &str) -> Result<(), FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    // Drain the body so the server finishes rendering it.
    response
        .bytes()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;
    Ok(())
}
