//! Concurrent score ranking.
//!
//! The engine owns the score store and the result accumulator for the whole
//! pass. Cache hits are resolved up front; misses go to a bounded
//! [`TaskPool`] whose workers each hold their own [`ScoreFetcher`] and report
//! back over the pool channel. The ranked list is produced only after the
//! pool has drained.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grater_core::obs::{
    emit_cache_flush_failed, emit_candidate_scored, emit_ranking_finished, emit_ranking_started,
    emit_score_fetch_failed,
};
use grater_core::{CandidateProject, PoolWorker, RankedModule, ScoreStore, TaskPool};
use tokio::time::sleep;

use crate::error::{DiscoveryResult, ScoreFetchError};
use crate::scorecard::{ScoreFetcher, ScoreFetcherFactory};

/// Ranking pass parameters.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Number of concurrent scoring workers.
    pub concurrency: usize,
    /// Keep only the top `limit` entries; `<= 0` keeps everything.
    pub limit: i64,
    /// Pause each worker takes after every scoring call.
    pub request_delay: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            concurrency: grater_core::config::DEFAULT_CONCURRENCY,
            limit: 0,
            request_delay: Duration::from_millis(grater_core::config::DEFAULT_REQUEST_DELAY_MS),
        }
    }
}

/// Ranked output of one pass plus scoring counters.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    pub ranked: Vec<RankedModule>,
    /// Candidates served from the cache without a network call.
    pub cache_hits: usize,
    /// Candidates scored by a successful API call.
    pub fetched: usize,
    /// Candidates whose scoring call failed and fell back to 0.0.
    pub failed: usize,
}

impl RankingOutcome {
    pub fn paths(&self) -> Vec<String> {
        self.ranked.iter().map(|m| m.path.to_string()).collect()
    }
}

struct ScoreJob {
    index: usize,
    project: CandidateProject,
}

struct ScoredCandidate {
    index: usize,
    project: CandidateProject,
    outcome: Result<f64, ScoreFetchError>,
}

struct ScoreWorker {
    fetcher: Arc<dyn ScoreFetcher>,
    delay: Duration,
}

#[async_trait]
impl PoolWorker<ScoreJob, ScoredCandidate> for ScoreWorker {
    async fn process(&mut self, job: ScoreJob) -> ScoredCandidate {
        let outcome = self.fetcher.fetch_score(&job.project).await;
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        ScoredCandidate {
            index: job.index,
            project: job.project,
            outcome,
        }
    }
}

/// Scores candidates under bounded concurrency and ranks them.
pub struct RankingEngine<F> {
    factory: F,
    config: RankingConfig,
}

impl<F: ScoreFetcherFactory> RankingEngine<F> {
    pub fn new(factory: F, config: RankingConfig) -> Self {
        Self { factory, config }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Score, sort and truncate `candidates`.
    ///
    /// Scoring failures degrade to 0.0 and are not cached. The store is
    /// flushed once at the end; a flush failure is logged, not returned.
    pub async fn rank<S: ScoreStore>(
        &self,
        candidates: Vec<CandidateProject>,
        store: &mut S,
    ) -> DiscoveryResult<RankingOutcome> {
        let pool = TaskPool::new(self.config.concurrency);
        emit_ranking_started(candidates.len(), pool.width());

        let mut scored: Vec<(usize, RankedModule)> = Vec::with_capacity(candidates.len());
        let mut jobs = Vec::new();
        let mut cache_hits = 0;

        for (index, project) in candidates.into_iter().enumerate() {
            match store.get(&project) {
                Some(score) if score != 0.0 => {
                    cache_hits += 1;
                    emit_candidate_scored(scored.len() + 1, project.as_str(), score, true);
                    scored.push((index, RankedModule { path: project, score }));
                }
                _ => jobs.push(ScoreJob { index, project }),
            }
        }

        let mut fetched = 0;
        let mut failed = 0;
        if !jobs.is_empty() {
            let worker_count = pool.width().min(jobs.len());
            let fetchers = (0..worker_count)
                .map(|id| self.factory.worker_fetcher(id))
                .collect::<DiscoveryResult<Vec<_>>>()?;

            let delay = self.config.request_delay;
            let mut run = pool.spawn(jobs, |id| ScoreWorker {
                fetcher: Arc::clone(&fetchers[id]),
                delay,
            });

            while let Some(result) = run.next().await {
                let score = match result.outcome {
                    Ok(score) => {
                        fetched += 1;
                        if score > 0.0 {
                            store.set(&result.project, score);
                        }
                        score
                    }
                    Err(e) => {
                        failed += 1;
                        emit_score_fetch_failed(result.project.as_str(), &e);
                        0.0
                    }
                };
                emit_candidate_scored(scored.len() + 1, result.project.as_str(), score, false);
                scored.push((
                    result.index,
                    RankedModule {
                        path: result.project,
                        score,
                    },
                ));
            }
            run.join().await?;
        }

        if let Err(e) = store.flush() {
            emit_cache_flush_failed(&e);
        }

        let ranked = sort_and_limit(scored, self.config.limit);
        emit_ranking_finished(ranked.len(), cache_hits, fetched, failed);
        Ok(RankingOutcome {
            ranked,
            cache_hits,
            fetched,
            failed,
        })
    }
}

/// Score descending, discovery order among equal scores, then truncate.
fn sort_and_limit(mut scored: Vec<(usize, RankedModule)>, limit: i64) -> Vec<RankedModule> {
    scored.sort_by(|(ia, a), (ib, b)| b.score.total_cmp(&a.score).then(ia.cmp(ib)));
    let mut ranked: Vec<RankedModule> = scored.into_iter().map(|(_, m)| m).collect();
    if limit > 0 {
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }
    ranked
}
