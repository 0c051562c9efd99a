//! Ranking pass behaviour against stubbed importer and scoring sources.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grater_core::{CandidateProject, FsScoreStore, MemoryScoreStore, ScoreStore};
use grater_discovery::{
    dedupe_candidates, discover_and_rank, DiscoveryError, DiscoveryResult, ImporterSource,
    RankingConfig, RankingEngine, ScoreFetchError, ScoreFetcher, ScoreFetcherFactory,
};
use tokio::time::sleep;

/// Scores from a fixed table; unknown projects fail with HTTP 404.
struct StubScores {
    scores: HashMap<String, f64>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl StubScores {
    fn new(entries: &[(&str, f64)], latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            scores: entries.iter().map(|(p, s)| (p.to_string(), *s)).collect(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            latency,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreFetcher for StubScores {
    async fn fetch_score(&self, project: &CandidateProject) -> Result<f64, ScoreFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.scores
            .get(project.as_str())
            .copied()
            .ok_or(ScoreFetchError::Status(404))
    }
}

/// Hands the same shared stub to every worker and counts workers built.
struct SharedFactory {
    stub: Arc<StubScores>,
    built: AtomicUsize,
}

impl SharedFactory {
    fn new(stub: Arc<StubScores>) -> Self {
        Self {
            stub,
            built: AtomicUsize::new(0),
        }
    }
}

impl ScoreFetcherFactory for SharedFactory {
    fn worker_fetcher(&self, _worker_id: usize) -> DiscoveryResult<Arc<dyn ScoreFetcher>> {
        self.built.fetch_add(1, Ordering::SeqCst);
        Ok(self.stub.clone())
    }
}

fn config(concurrency: usize, limit: i64) -> RankingConfig {
    RankingConfig {
        concurrency,
        limit,
        request_delay: Duration::ZERO,
    }
}

fn candidates(paths: &[&str]) -> Vec<CandidateProject> {
    dedupe_candidates(paths.iter().copied())
}

#[tokio::test]
async fn cache_hit_and_live_fetch_rank_by_score() {
    let stub = StubScores::new(&[("github.com/c/d", 6.2)], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub.clone()), config(5, 0));
    let mut store = MemoryScoreStore::with_scores([("github.com/a/b", 8.5)]);

    let outcome = engine
        .rank(candidates(&["github.com/a/b", "github.com/c/d"]), &mut store)
        .await
        .unwrap();

    assert_eq!(outcome.paths(), vec!["github.com/a/b", "github.com/c/d"]);
    assert_eq!(outcome.ranked[0].score, 8.5);
    assert_eq!(outcome.ranked[1].score, 6.2);
    assert_eq!(outcome.cache_hits, 1);
    assert_eq!(outcome.fetched, 1);
    assert_eq!(stub.calls(), 1, "cached project must not be fetched");
    assert_eq!(store.get(&CandidateProject::new("github.com/c/d")), Some(6.2));
}

#[tokio::test]
async fn limit_one_keeps_top_entry() {
    let stub = StubScores::new(&[("github.com/c/d", 6.2)], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub), config(5, 1));
    let mut store = MemoryScoreStore::with_scores([("github.com/a/b", 8.5)]);

    let outcome = engine
        .rank(candidates(&["github.com/a/b", "github.com/c/d"]), &mut store)
        .await
        .unwrap();
    assert_eq!(outcome.paths(), vec!["github.com/a/b"]);
}

#[tokio::test]
async fn failed_fetch_scores_zero_and_is_not_cached() {
    let stub = StubScores::new(&[("github.com/ok/one", 3.0)], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub.clone()), config(2, 0));
    let mut store = MemoryScoreStore::new();

    let outcome = engine
        .rank(
            candidates(&["github.com/gone/away", "github.com/ok/one"]),
            &mut store,
        )
        .await
        .unwrap();

    assert_eq!(outcome.paths(), vec!["github.com/ok/one", "github.com/gone/away"]);
    assert_eq!(outcome.ranked[1].score, 0.0);
    assert_eq!(outcome.failed, 1);
    assert_eq!(store.get(&CandidateProject::new("github.com/gone/away")), None);

    // The failed project is retried on the next pass.
    engine
        .rank(candidates(&["github.com/gone/away"]), &mut store)
        .await
        .unwrap();
    assert_eq!(stub.calls(), 3);
}

#[tokio::test]
async fn zero_score_in_cache_is_refetched() {
    let stub = StubScores::new(&[("github.com/a/b", 4.4)], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub.clone()), config(1, 0));
    let mut store = MemoryScoreStore::with_scores([("github.com/a/b", 0.0)]);

    let outcome = engine
        .rank(candidates(&["github.com/a/b"]), &mut store)
        .await
        .unwrap();
    assert_eq!(outcome.ranked[0].score, 4.4);
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn equal_scores_keep_discovery_order_under_concurrency() {
    let entries: Vec<(String, f64)> = (0..24)
        .map(|i| (format!("github.com/org/repo{i:02}"), if i % 3 == 0 { 9.0 } else { 5.0 }))
        .collect();
    let refs: Vec<(&str, f64)> = entries.iter().map(|(p, s)| (p.as_str(), *s)).collect();
    let stub = StubScores::new(&refs, Duration::from_millis(3));
    let engine = RankingEngine::new(SharedFactory::new(stub), config(5, 0));
    let mut store = MemoryScoreStore::new();

    let paths: Vec<&str> = entries.iter().map(|(p, _)| p.as_str()).collect();
    let outcome = engine.rank(candidates(&paths), &mut store).await.unwrap();

    let mut expected: Vec<&str> = paths.iter().copied().enumerate().filter(|(i, _)| i % 3 == 0).map(|(_, p)| p).collect();
    expected.extend(paths.iter().copied().enumerate().filter(|(i, _)| i % 3 != 0).map(|(_, p)| p));
    assert_eq!(outcome.paths(), expected);
}

#[tokio::test]
async fn at_most_width_scoring_calls_in_flight() {
    let entries: Vec<(String, f64)> = (0..30)
        .map(|i| (format!("github.com/org/r{i}"), 1.0 + i as f64))
        .collect();
    let refs: Vec<(&str, f64)> = entries.iter().map(|(p, s)| (p.as_str(), *s)).collect();
    let stub = StubScores::new(&refs, Duration::from_millis(5));
    let factory = Arc::new(SharedFactory::new(stub.clone()));
    let engine = RankingEngine::new(factory.clone(), config(5, 0));
    let mut store = MemoryScoreStore::new();

    let paths: Vec<&str> = entries.iter().map(|(p, _)| p.as_str()).collect();
    let outcome = engine.rank(candidates(&paths), &mut store).await.unwrap();

    assert_eq!(outcome.ranked.len(), 30);
    assert_eq!(stub.calls(), 30);
    let max = stub.max_in_flight.load(Ordering::SeqCst);
    assert!(max <= 5, "max_in_flight={max}");
    assert!(max > 1, "expected concurrent scoring, max_in_flight={max}");
    assert_eq!(factory.built.load(Ordering::SeqCst), 5, "one fetcher per worker");
}

#[tokio::test]
async fn warm_cache_second_pass_is_idempotent_and_offline() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("cache.json");
    let stub = StubScores::new(
        &[
            ("github.com/a/b", 2.0),
            ("github.com/c/d", 7.0),
            ("github.com/e/f", 7.0),
        ],
        Duration::ZERO,
    );
    let engine = RankingEngine::new(SharedFactory::new(stub.clone()), config(3, 0));
    let list = candidates(&["github.com/a/b", "github.com/c/d", "github.com/e/f"]);

    let mut store = FsScoreStore::open(&cache_path);
    let first = engine.rank(list.clone(), &mut store).await.unwrap();
    assert_eq!(stub.calls(), 3);

    let mut reopened = FsScoreStore::open(&cache_path);
    let second = engine.rank(list, &mut reopened).await.unwrap();

    assert_eq!(stub.calls(), 3, "warm cache must not hit the API");
    assert_eq!(second.cache_hits, 3);
    assert_eq!(first.ranked, second.ranked);
    assert_eq!(
        second.paths(),
        vec!["github.com/c/d", "github.com/e/f", "github.com/a/b"]
    );
}

#[tokio::test]
async fn request_delay_is_applied_per_worker() {
    let stub = StubScores::new(&[("github.com/a/b", 1.0), ("github.com/c/d", 2.0)], Duration::ZERO);
    let engine = RankingEngine::new(
        SharedFactory::new(stub),
        RankingConfig {
            concurrency: 1,
            limit: 0,
            request_delay: Duration::from_millis(20),
        },
    );
    let mut store = MemoryScoreStore::new();
    let started = std::time::Instant::now();
    engine
        .rank(candidates(&["github.com/a/b", "github.com/c/d"]), &mut store)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(40));
}

struct StaticImporter(DiscoveryResult<Vec<CandidateProject>>);

#[async_trait]
impl ImporterSource for StaticImporter {
    async fn fetch_importers(&self, _library: &str) -> DiscoveryResult<Vec<CandidateProject>> {
        match &self.0 {
            Ok(v) => Ok(v.clone()),
            Err(_) => Err(DiscoveryError::Status {
                url: "stub".to_string(),
                status: 500,
            }),
        }
    }
}

#[tokio::test]
async fn discovery_failure_aborts_before_scoring() {
    let stub = StubScores::new(&[], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub.clone()), config(5, 0));
    let importer = StaticImporter(Err(DiscoveryError::Parse("x".to_string())));
    let mut store = MemoryScoreStore::new();

    let err = discover_and_rank(&importer, &engine, "github.com/acme/lib", &mut store)
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Status { status: 500, .. }));
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn no_importers_yields_empty_ranking() {
    let stub = StubScores::new(&[], Duration::ZERO);
    let engine = RankingEngine::new(SharedFactory::new(stub), config(5, 3));
    let importer = StaticImporter(Ok(Vec::new()));
    let mut store = MemoryScoreStore::new();

    let outcome = discover_and_rank(&importer, &engine, "github.com/acme/lib", &mut store)
        .await
        .unwrap();
    assert!(outcome.ranked.is_empty());
}
