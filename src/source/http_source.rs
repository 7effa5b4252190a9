use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Url};
use tracing::{debug, warn};

use super::traits::WordListFetcher;
use crate::config::{ASSETS_DIR, FETCH_TIMEOUT_SECONDS};

/// Fetcher for word lists published next to the client, at `<base_url>/assets/<name>`.
pub struct HttpSource {
    client: Client,
    base_url: Arc<RwLock<String>>,
}

impl HttpSource {
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECONDS))
            .build()
            .unwrap_or_else(|e| {
                warn!("http client builder failed, using defaults: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: Arc::new(RwLock::new(base_url)),
        }
    }

    /// Point subsequent fetches at a different asset host.
    pub fn update_base_url(&self, base_url: String) {
        if !base_url.trim().is_empty() {
            *self.base_url.write() = base_url;
        }
    }

    /// Resolve the asset URL for `name`.
    pub fn asset_url(&self, name: &str) -> Result<Url> {
        let base = self.base_url.read().clone();
        let mut url = Url::parse(&base).map_err(|e| anyhow!("invalid asset base url: {}", e))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("asset base url cannot be a base: {}", base))?
            .pop_if_empty()
            .push(ASSETS_DIR)
            .push(name);
        Ok(url)
    }

    fn build_request(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }
}

#[async_trait]
impl WordListFetcher for HttpSource {
    async fn fetch(&self, name: &str) -> Result<Bytes> {
        let url = self.asset_url(name)?;
        debug!("http fetch {}", url);
        let resp = self.build_request(url.clone()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!("http fetch failed status={} url={}", status.as_u16(), url);
            return Err(anyhow!("fetch failed: HTTP {}", status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        debug!("http fetch {} done ({} bytes)", name, bytes.len());
        Ok(bytes)
    }
}
