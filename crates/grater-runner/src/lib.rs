//! Grater Runner - dual-ref downstream test orchestration
//!
//! Provides a sequential orchestrator that:
//! - Invokes the test executor once per ranked module with base and head refs
//! - Classifies each dual result, recording executor failures as `ERROR`
//! - Persists the simplified and detailed result artifacts

pub mod error;
pub mod executor;
pub mod orchestrator;

pub use error::{ExecutorInvocationError, RunnerError};
pub use executor::{parse_payload, DockerExecutor, ExecutionRequest, TestExecutor};
pub use orchestrator::{ModuleRecord, OrchestrationOutcome, Orchestrator, RunObserver, RunTarget};
