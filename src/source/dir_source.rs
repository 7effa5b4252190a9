use std::path::{Component, Path, PathBuf};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::traits::WordListFetcher;

/// Fetcher that reads word lists from a local directory, `<root>/<name>`.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> Result<PathBuf> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            return Err(anyhow!("invalid source name: {:?}", name));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl WordListFetcher for DirSource {
    async fn fetch(&self, name: &str) -> Result<Bytes> {
        let path = self.resolve(name)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| anyhow!("read {} failed: {}", path.display(), e))?;
        debug!("dir source read {} ({} bytes)", path.display(), data.len());
        Ok(Bytes::from(data))
    }
}
