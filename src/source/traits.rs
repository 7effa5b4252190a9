use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Where a word-list source came from. Drives encoding selection and removal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceOrigin {
    /// Fetched by name from the asset location (checkbox selection).
    Fetched,
    /// Supplied by the user as a file upload.
    Uploaded,
}

#[async_trait]
pub trait WordListFetcher: Send + Sync {
    /// Fetch the raw bytes of the named word list. One attempt, no retry.
    async fn fetch(&self, name: &str) -> Result<Bytes>;
}
