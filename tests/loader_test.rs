// Integration tests for selection loading, uploads and family switches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use ripper_engine::api::client::RipperClient;
use ripper_engine::config::RipperConfig;
use ripper_engine::matcher::{AlgorithmFamily, AlgorithmId, DefaultEngineFactory, DigestKind};
use ripper_engine::source::dir_source::DirSource;
use ripper_engine::source::traits::WordListFetcher;
use ripper_engine::RipperError;

/// In-memory asset host that counts fetches per name and answers slowly.
struct CountingFetcher {
    assets: HashMap<String, Vec<u8>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Duration,
}

impl CountingFetcher {
    fn new(assets: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            assets: assets
                .iter()
                .map(|(name, text)| (name.to_string(), text.as_bytes().to_vec()))
                .collect(),
            calls: Mutex::new(HashMap::new()),
            delay: Duration::from_millis(20),
        })
    }

    fn calls(&self, name: &str) -> usize {
        self.calls.lock().get(name).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

#[async_trait]
impl WordListFetcher for CountingFetcher {
    async fn fetch(&self, name: &str) -> Result<Bytes> {
        *self.calls.lock().entry(name.to_string()).or_insert(0) += 1;
        tokio::time::sleep(self.delay).await;
        self.assets
            .get(name)
            .map(|data| Bytes::from(data.clone()))
            .ok_or_else(|| anyhow!("fetch failed: HTTP 404"))
    }
}

fn client(fetcher: Arc<CountingFetcher>) -> RipperClient {
    RipperClient::with_parts(RipperConfig::default(), fetcher, Arc::new(DefaultEngineFactory))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_overlapping_selections_fetch_each_source_once() {
    let fetcher = CountingFetcher::new(&[
        ("a.txt", "one\ntwo"),
        ("b.txt", "three"),
        ("c.txt", "four\nfive\nsix"),
    ]);
    let client = client(fetcher.clone());

    let first = names(&["a.txt", "b.txt"]);
    let second = names(&["b.txt", "c.txt"]);
    let (r1, r2) = tokio::join!(client.select_sources(&first), client.select_sources(&second));

    assert!(r1.is_complete() && r2.is_complete());
    assert_eq!(fetcher.calls("a.txt"), 1);
    assert_eq!(fetcher.calls("b.txt"), 1);
    assert_eq!(fetcher.calls("c.txt"), 1);

    // The later call wins and only fetched what the earlier one had not cached.
    assert_eq!(r2.selection, second);
    assert_eq!(r2.fetched, names(&["c.txt"]));
    assert_eq!(client.word_count(), 4);
}

#[tokio::test]
async fn test_failed_source_is_left_out() {
    let fetcher = CountingFetcher::new(&[("a.txt", "one\ntwo")]);
    let client = client(fetcher.clone());

    let report = client.select_sources(&names(&["a.txt", "missing.txt"])).await;

    assert_eq!(report.selection, names(&["a.txt"]));
    assert_eq!(report.word_count, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        RipperError::SourceLoad { name, .. } if name == "missing.txt"
    ));
    assert!(!client.store().has("missing.txt"));

    // No retry policy: the next selection simply tries again.
    client.select_sources(&names(&["a.txt", "missing.txt"])).await;
    assert_eq!(fetcher.calls("missing.txt"), 2);
    assert_eq!(fetcher.calls("a.txt"), 1);
}

#[tokio::test]
async fn test_family_round_trip_keeps_word_count_without_refetch() {
    let fetcher = CountingFetcher::new(&[("a.txt", "one\ntwo"), ("b.txt", "three\none")]);
    let client = client(fetcher.clone());

    let report = client.select_sources(&names(&["a.txt", "b.txt"])).await;
    assert_eq!(report.word_count, 4);
    let fetches = fetcher.total_calls();

    let forward = client.run("x", DigestKind::Sha256.id()).unwrap();
    let before = forward.status().word_count;
    drop(forward);

    let derive = client.run("x", AlgorithmId::DERIVE).unwrap();
    assert_eq!(derive.status().word_count, before);
    drop(derive);

    let back = client.run("x", DigestKind::Sha1.id()).unwrap();
    assert_eq!(back.status().word_count, before);
    assert_eq!(client.pool().lock().current_family(), Some(AlgorithmFamily::Forward));
    assert_eq!(fetcher.total_calls(), fetches);
}

#[tokio::test]
async fn test_uploads_follow_checkbox_sources() {
    let fetcher = CountingFetcher::new(&[("a.txt", "one\ntwo")]);
    let client = client(fetcher.clone());

    client.select_sources(&names(&["a.txt"])).await;
    let report = client.upload_source("mine.txt", "secret\nhunter2".as_bytes()).await.unwrap();
    assert_eq!(report.selection, names(&["a.txt", "mine.txt"]));
    assert_eq!(report.word_count, 4);

    // Checkbox changes keep uploads appended.
    let report = client.select_sources(&names(&[])).await;
    assert_eq!(report.selection, names(&["mine.txt"]));
    assert_eq!(report.word_count, 2);

    let report = client.remove_upload("mine.txt").await.unwrap();
    assert!(report.selection.is_empty());
    assert_eq!(client.word_count(), 0);
    assert_eq!(fetcher.calls("mine.txt"), 0);
}

#[tokio::test]
async fn test_upload_errors() {
    let fetcher = CountingFetcher::new(&[("a.txt", "one")]);
    let client = client(fetcher);
    client.select_sources(&names(&["a.txt"])).await;

    // UTF-16LE BOM followed by an unpaired surrogate.
    let err = client.upload_source("bad.txt", &[0xFF, 0xFE, 0x00, 0xD8]).await;
    assert!(matches!(err, Err(RipperError::SourceLoad { .. })));
    assert!(!client.store().has("bad.txt"));

    let err = client.remove_upload("a.txt").await;
    assert!(matches!(err, Err(RipperError::Configuration(_))));
    assert!(client.store().has("a.txt"));
}

#[tokio::test]
async fn test_upload_cannot_shadow_fetched_source() {
    let fetcher = CountingFetcher::new(&[("a.txt", "one\ntwo")]);
    let client = client(fetcher);
    client.select_sources(&names(&["a.txt"])).await;

    let err = client.upload_source("a.txt", "secret".as_bytes()).await;
    assert!(matches!(err, Err(RipperError::Configuration(_))));
    assert!(client.store().uploaded_names().is_empty());
    assert_eq!(client.store().get("a.txt").unwrap().text(), "one\ntwo");

    // Unchecking the fetched source still removes it from the selection.
    let report = client.select_sources(&names(&[])).await;
    assert!(report.selection.is_empty());
    assert_eq!(report.word_count, 0);
}

#[tokio::test]
async fn test_dir_source_feeds_selection() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("english.txt"), "alpha\r\nbeta\r\n").unwrap();
    std::fs::write(dir.path().join("spanish.txt"), [0x61u8, 0xF1, 0x6F]).unwrap();

    let client = RipperClient::with_parts(
        RipperConfig::default(),
        Arc::new(DirSource::new(dir.path())),
        Arc::new(DefaultEngineFactory),
    );
    let report = client
        .select_sources(&names(&["english.txt", "spanish.txt", "nope.txt"]))
        .await;

    assert_eq!(report.selection, names(&["english.txt", "spanish.txt"]));
    assert_eq!(report.word_count, 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(client.store().get("spanish.txt").unwrap().text(), "año");
}
