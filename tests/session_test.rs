// Integration tests for match sessions driven against the engine pool.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use ripper_engine::api::client::RipperClient;
use ripper_engine::config::{RipperConfig, DEFAULT_BATCH_SIZE};
use ripper_engine::engine::pool::EnginePool;
use ripper_engine::engine::scheduler::{Immediate, YieldEach};
use ripper_engine::engine::session::{MatchSession, SessionState};
use ripper_engine::matcher::forward::ForwardEngine;
use ripper_engine::matcher::{
    Advance, AlgorithmFamily, AlgorithmId, DefaultEngineFactory, DigestKind, EngineFactory,
    MatchEngine,
};
use ripper_engine::RipperError;

fn pool_with(words: &str) -> EnginePool {
    let mut pool = EnginePool::new(Arc::new(DefaultEngineFactory));
    pool.load_word_list(words, &["w1.txt".to_string()]);
    pool
}

#[test]
fn test_run_finds_secret() {
    let mut pool = pool_with("alpha\nbeta\nsecret");
    let mut session = MatchSession::new();
    let target = DigestKind::Sha256.encode("secret");
    session.start(&mut pool, &target, DigestKind::Sha256.id()).unwrap();

    let first = session.step(2).unwrap();
    assert_eq!(first.state, SessionState::Running);
    assert_eq!(first.progress, 2);
    assert!(!first.matched);
    assert_eq!(first.last_candidate, "beta");

    let second = session.step(2).unwrap();
    assert_eq!(second.state, SessionState::Found);
    assert!(second.matched);
    assert_eq!(second.progress, 3);
    assert_eq!(second.matched_value.as_deref(), Some("secret"));

    let status = session.status();
    assert_eq!(status.matched_algorithm, Some(DigestKind::Sha256.id()));
    assert_eq!(status.word_count, 3);
    assert_eq!(status.slices, 2);
}

#[test]
fn test_run_exhausts_word_list() {
    let mut pool = pool_with("alpha\nbeta\nsecret");
    let mut session = MatchSession::new();
    let target = DigestKind::Sha256.encode("nothing");
    session.start(&mut pool, &target, DigestKind::Sha256.id()).unwrap();

    assert_eq!(session.step(2).unwrap().progress, 2);
    let outcome = session.step(2).unwrap();
    assert_eq!(outcome.progress, 3);
    assert!(outcome.exhausted);
    assert_eq!(outcome.state, SessionState::Exhausted);

    // Elapsed time is frozen once the session is terminal.
    let elapsed = session.elapsed();
    std::thread::sleep(std::time::Duration::from_millis(5));
    assert_eq!(session.elapsed(), elapsed);
}

#[test]
fn test_match_wins_over_exhaustion_on_last_word() {
    let mut pool = pool_with("alpha\nbeta\nsecret");
    let mut session = MatchSession::new();
    session
        .start(&mut pool, &DigestKind::Sha1.encode("secret"), DigestKind::Sha1.id())
        .unwrap();
    let outcome = session.step(500).unwrap();
    assert_eq!(outcome.state, SessionState::Found);
    assert!(!outcome.exhausted);
}

#[test]
fn test_start_while_running_is_rejected() {
    let mut pool = pool_with("alpha\nbeta\nsecret");
    let mut session = MatchSession::new();
    session.start(&mut pool, "zzz", DigestKind::Base64.id()).unwrap();
    session.step(1).unwrap();

    let err = session.start(&mut pool, "other", DigestKind::Sha1.id());
    assert!(matches!(err, Err(RipperError::Configuration(_))));
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(session.input(), "zzz");
    assert_eq!(session.status().progress, 1);
    assert_eq!(session.status().algorithm, Some(DigestKind::Base64.id()));
}

#[test]
fn test_cancel_takes_effect_at_next_step() {
    let mut pool = pool_with("a\nb\nc\nd\ne");
    let mut session = MatchSession::new();
    session.start(&mut pool, "zzz", DigestKind::Sha1.id()).unwrap();
    session.step(1).unwrap();

    session.cancel();
    assert_eq!(session.state(), SessionState::Running);
    let outcome = session.step(1).unwrap();
    assert_eq!(outcome.state, SessionState::Cancelled);
    assert_eq!(outcome.progress, 2);
    assert!(!pool.is_busy(AlgorithmFamily::Forward));
}

#[test]
fn test_cancel_handle_does_not_outlive_run() {
    let mut pool = pool_with("a\nb\nc");
    let mut session = MatchSession::new();
    session.start(&mut pool, "zzz", DigestKind::Sha1.id()).unwrap();
    let handle = session.cancel_handle();
    handle.cancel();
    assert_eq!(session.step(1).unwrap().state, SessionState::Cancelled);

    // A restart gets a fresh token; the stale handle has no effect on it.
    session.start(&mut pool, "zzz", DigestKind::Sha1.id()).unwrap();
    assert!(handle.is_cancelled());
    assert_eq!(session.step(1).unwrap().state, SessionState::Running);
}

#[tokio::test]
async fn test_cancel_from_another_task_stops_drive() {
    let words: Vec<String> = (0..10_000).map(|i| format!("w{}", i)).collect();
    let mut pool = pool_with(&words.join("\n"));
    let mut session = MatchSession::new();
    session.start(&mut pool, "zzz", DigestKind::Sha256.id()).unwrap();

    let handle = session.cancel_handle();
    let canceller = tokio::spawn(async move {
        tokio::task::yield_now().await;
        handle.cancel();
    });

    let status = session.drive(&YieldEach, 1).await.unwrap();
    canceller.await.unwrap();
    assert_eq!(status.state, SessionState::Cancelled);
    assert!(status.progress < 10_000);
}

/// Forward engine whose `advance` always faults.
struct FaultyEngine(ForwardEngine);

impl MatchEngine for FaultyEngine {
    fn family(&self) -> AlgorithmFamily {
        self.0.family()
    }

    fn load_word_list(&mut self, merged_text: &str, names: &[String]) -> usize {
        self.0.load_word_list(merged_text, names)
    }

    fn has_source(&self, name: &str) -> bool {
        self.0.has_source(name)
    }

    fn word_count(&self) -> usize {
        self.0.word_count()
    }

    fn set_algorithm(&mut self, id: AlgorithmId) -> Result<()> {
        self.0.set_algorithm(id)
    }

    fn set_target(&mut self, input: &str) -> Result<()> {
        self.0.set_target(input)
    }

    fn advance(&mut self, _batch_size: usize) -> Result<Advance> {
        Err(anyhow!("digest backend crashed"))
    }
}

struct FaultyFactory;

impl EngineFactory for FaultyFactory {
    fn create(&self, family: AlgorithmFamily) -> Box<dyn MatchEngine> {
        match family {
            AlgorithmFamily::Forward => Box::new(FaultyEngine(ForwardEngine::new())),
            AlgorithmFamily::Derive => DefaultEngineFactory.create(family),
        }
    }
}

#[test]
fn test_engine_fault_cancels_session_only() {
    let mut pool = EnginePool::new(Arc::new(FaultyFactory));
    pool.load_word_list("alpha\nbeta", &["w1.txt".to_string()]);

    let mut session = MatchSession::new();
    session.start(&mut pool, "zzz", DigestKind::Sha1.id()).unwrap();
    let err = session.step(10).unwrap_err();
    assert!(matches!(err, RipperError::Engine(ref msg) if msg.contains("crashed")));
    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(session.status().error, Some(err));

    // The pool and the other family keep working.
    assert!(!pool.is_busy(AlgorithmFamily::Forward));
    let mut other = MatchSession::new();
    other
        .start(&mut pool, &DigestKind::Sha1.encode("beta"), AlgorithmId::DERIVE)
        .unwrap();
    assert_eq!(other.step(10).unwrap().state, SessionState::Found);
}

#[test]
fn test_unknown_algorithm_rejected_before_running() {
    let mut pool = pool_with("alpha");
    let mut session = MatchSession::new();
    let err = session.start(&mut pool, "zzz", AlgorithmId(9));
    assert!(matches!(err, Err(RipperError::Configuration(_))));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(pool.current_family(), Some(AlgorithmFamily::Forward));
}

#[tokio::test]
async fn test_drive_to_found() {
    let mut pool = pool_with("one\ntwo\nthree\nfour");
    let mut session = MatchSession::new();
    session
        .start(&mut pool, &DigestKind::Base64.encode("three"), DigestKind::Base64.id())
        .unwrap();
    let status = session.drive(&Immediate, 1).await.unwrap();
    assert_eq!(status.state, SessionState::Found);
    assert_eq!(status.progress, 3);
    assert_eq!(status.slices, 3);
    assert_eq!(status.last_candidate, "three");
}

#[tokio::test]
async fn test_client_runs_derive_family() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("w1.txt"), "alpha\nbeta\nsecret\n").unwrap();
    let client = RipperClient::with_parts(
        RipperConfig::default(),
        Arc::new(ripper_engine::source::dir_source::DirSource::new(dir.path())),
        Arc::new(DefaultEngineFactory),
    );
    client.select_sources(&["w1.txt".to_string()]).await;

    // Sha1 is the third digest tried, so two full rounds come first.
    let target = DigestKind::Sha1.encode("beta");
    let status = client
        .run_to_completion(&target, AlgorithmId::DERIVE, &Immediate)
        .await
        .unwrap();
    assert_eq!(status.state, SessionState::Found);
    assert_eq!(status.family, Some(AlgorithmFamily::Derive));
    assert_eq!(status.matched_value.as_deref(), Some("beta"));
    assert_eq!(status.matched_algorithm, Some(DigestKind::Sha1.id()));
    assert_eq!(status.progress, 2 * 3 + 2);

    let status = client
        .run_to_completion("not-a-digest", 0u8, &Immediate)
        .await
        .unwrap();
    assert_eq!(status.state, SessionState::Exhausted);
    assert_eq!(status.progress, 3 * 3);
}

#[test]
fn test_config_defaults_fill_missing_fields() {
    let config: RipperConfig =
        serde_json::from_str(r#"{"asset_base_url": "http://assets.local/app/"}"#).unwrap();
    assert_eq!(config.asset_base_url, "http://assets.local/app/");
    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.frame_interval_ms, 16);
    assert_eq!(config.log_filter, ripper_engine::config::DEFAULT_LOG_FILTER);
}
