//! Grater Core Library
//!
//! Shared model and logic for downstream regression runs: the dual-result
//! classifier, report aggregation and rendering, the score cache store, the
//! workspace artifacts exchanged between passes, and the bounded task pool
//! used by the ranking engine.

pub mod classify;
pub mod config;
pub mod domain;
pub mod obs;
pub mod pool;
pub mod report;
pub mod store;
pub mod telemetry;
pub mod workspace;

pub use classify::classify;
pub use config::GraterConfig;
pub use domain::{
    CandidateProject, DualTestResult, GraterError, ModuleStatus, ModuleStatusEntry, RankedModule,
    RefOutcome, Result, RECOGNIZED_HOST,
};
pub use obs::PassSpan;
pub use pool::{CancelHook, PoolError, PoolRun, PoolWorker, TaskPool};
pub use report::{render_human, render_json, ReportSummary, Verdict};
pub use store::{FsScoreStore, MemoryScoreStore, ScoreStore};
pub use telemetry::init_tracing;
pub use workspace::Workspace;

/// Grater version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
