//! Error types for test execution and orchestration.

use thiserror::Error;

/// The external test process failed to run or returned an invalid payload.
///
/// Absorbed per module by the orchestrator, which records the module as
/// `ERROR` and moves on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecutorInvocationError {
    #[error("failed to start executor: {0}")]
    Spawn(String),

    #[error("executor exited with status {code:?}: {output}")]
    NonZeroExit { code: Option<i32>, output: String },

    #[error("invalid JSON from executor ({reason}): {output}")]
    InvalidPayload { reason: String, output: String },
}

/// Pass-level failures of a run.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("image build failed: {0}")]
    ImageBuild(String),

    #[error("failed to persist results: {0}")]
    Persist(#[from] grater_core::GraterError),
}
