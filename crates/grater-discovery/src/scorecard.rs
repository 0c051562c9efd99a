//! Scoring API client.
//!
//! Each ranking worker gets its own [`ScoreFetcher`] from a
//! [`ScoreFetcherFactory`], so a slow connection on one worker never queues
//! requests behind it on a shared connection pool.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use grater_core::{CandidateProject, RECOGNIZED_HOST};
use serde::Deserialize;

use crate::error::{DiscoveryError, DiscoveryResult, ScoreFetchError};

/// Fetches the external trust score of a single project.
#[async_trait]
pub trait ScoreFetcher: Send + Sync {
    async fn fetch_score(&self, project: &CandidateProject) -> Result<f64, ScoreFetchError>;
}

/// Builds one fetcher per ranking worker.
pub trait ScoreFetcherFactory: Send + Sync {
    fn worker_fetcher(&self, worker_id: usize) -> DiscoveryResult<Arc<dyn ScoreFetcher>>;
}

impl<T: ScoreFetcherFactory + ?Sized> ScoreFetcherFactory for Arc<T> {
    fn worker_fetcher(&self, worker_id: usize) -> DiscoveryResult<Arc<dyn ScoreFetcher>> {
        (**self).worker_fetcher(worker_id)
    }
}

#[derive(Debug, Deserialize)]
struct ScorecardPayload {
    score: f64,
}

/// Client for an OpenSSF Scorecard-compatible REST API.
pub struct ScorecardClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl ScorecardClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DiscoveryResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("grater/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| DiscoveryError::ClientBuild(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Endpoint for `project`, or an error when it is not `github.com/owner/repo`.
    pub fn project_url(&self, project: &CandidateProject) -> Result<String, ScoreFetchError> {
        let (owner, repo) = project
            .owner_repo()
            .ok_or_else(|| ScoreFetchError::UnsupportedProject(project.to_string()))?;
        Ok(format!(
            "{}/projects/{}/{}/{}",
            self.base_url, RECOGNIZED_HOST, owner, repo
        ))
    }
}

#[async_trait]
impl ScoreFetcher for ScorecardClient {
    async fn fetch_score(&self, project: &CandidateProject) -> Result<f64, ScoreFetchError> {
        let url = self.project_url(project)?;
        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ScoreFetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await?;
        let payload: ScorecardPayload = serde_json::from_slice(&bytes)
            .map_err(|e| ScoreFetchError::Decode(e.to_string()))?;
        Ok(payload.score)
    }
}

/// Factory producing an independent [`ScorecardClient`] per worker.
#[derive(Debug, Clone)]
pub struct ScorecardFactory {
    pub base_url: String,
    pub timeout: Duration,
}

impl ScorecardFactory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

impl ScoreFetcherFactory for ScorecardFactory {
    fn worker_fetcher(&self, _worker_id: usize) -> DiscoveryResult<Arc<dyn ScoreFetcher>> {
        Ok(Arc::new(ScorecardClient::new(
            self.base_url.clone(),
            self.timeout,
        )?))
    }
}
