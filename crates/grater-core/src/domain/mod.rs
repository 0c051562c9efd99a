//! Grater domain model.

pub mod error;
pub mod project;
pub mod result;

pub use error::{GraterError, Result};
pub use project::{CandidateProject, RankedModule, RECOGNIZED_HOST};
pub use result::{DualTestResult, ModuleStatus, ModuleStatusEntry, RefOutcome};
