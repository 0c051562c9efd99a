//! Structured observability hooks for ranking and orchestration passes.
//!
//! Every event carries an `event` field; a [`PassSpan`] tags all events of
//! one pass with its `pass_id`.

use tracing::{info, warn};
use uuid::Uuid;

/// RAII guard that enters a pass-scoped tracing span.
pub struct PassSpan {
    pass_id: Uuid,
    _span: tracing::span::EnteredSpan,
}

impl PassSpan {
    /// Create and enter a span for a pass of `kind` (`"find"`, `"run"`).
    pub fn enter(kind: &str) -> Self {
        let pass_id = Uuid::new_v4();
        let span = tracing::info_span!("grater.pass", kind = %kind, pass_id = %pass_id);
        Self {
            pass_id,
            _span: span.entered(),
        }
    }

    pub fn pass_id(&self) -> Uuid {
        self.pass_id
    }
}

pub fn emit_ranking_started(candidates: usize, workers: usize) {
    info!(event = "rank.started", candidates, workers);
}

pub fn emit_candidate_scored(position: usize, path: &str, score: f64, cached: bool) {
    info!(event = "rank.scored", position, path = %path, score, cached);
}

/// Warning: a scoring call failed and the candidate falls back to 0.0.
pub fn emit_score_fetch_failed(path: &str, error: &dyn std::fmt::Display) {
    warn!(event = "rank.fetch_failed", path = %path, error = %error);
}

pub fn emit_cache_flush_failed(error: &dyn std::fmt::Display) {
    warn!(event = "rank.cache_flush_failed", error = %error);
}

pub fn emit_ranking_finished(ranked: usize, cache_hits: usize, fetched: usize, failed: usize) {
    info!(event = "rank.finished", ranked, cache_hits, fetched, failed);
}

pub fn emit_module_tested(index: usize, total: usize, module: &str, status: &str) {
    info!(event = "run.module_tested", index, total, module = %module, status = %status);
}

pub fn emit_invocation_failed(module: &str, error: &dyn std::fmt::Display) {
    warn!(event = "run.invocation_failed", module = %module, error = %error);
}

pub fn emit_verdict_computed(total: usize, verdict: &str) {
    info!(event = "report.verdict", total, verdict = %verdict);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_span_ids_are_unique() {
        let a = PassSpan::enter("rank");
        let b = PassSpan::enter("run");
        assert_ne!(a.pass_id(), b.pass_id());
    }
}
