//! Sequential dual-ref orchestration over the ranked module list.
//!
//! Modules run strictly one at a time, in ranked order. A module whose
//! executor invocation fails is recorded as `ERROR` and the pass continues.

use std::path::PathBuf;

use grater_core::obs::{emit_invocation_failed, emit_module_tested};
use grater_core::{
    classify, DualTestResult, ModuleStatus, ModuleStatusEntry, RefOutcome, Workspace,
};
use tracing::info;

use crate::error::RunnerError;
use crate::executor::{ExecutionRequest, TestExecutor};

/// Repository and refs under comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    pub repo: String,
    pub base_ref: String,
    pub head_ref: String,
}

impl RunTarget {
    pub fn new(
        repo: impl Into<String>,
        base_ref: impl Into<String>,
        head_ref: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            base_ref: base_ref.into(),
            head_ref: head_ref.into(),
        }
    }

    fn request(&self, module: &str) -> ExecutionRequest {
        ExecutionRequest {
            module: module.to_string(),
            repo: self.repo.clone(),
            base_ref: self.base_ref.clone(),
            head_ref: self.head_ref.clone(),
        }
    }
}

/// Outcome of one module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleRecord {
    pub status: ModuleStatus,
    pub result: DualTestResult,
    /// Set when the executor itself could not produce a result.
    pub invocation_error: Option<String>,
}

/// Progress hooks for a run. The unit type ignores every event.
pub trait RunObserver {
    fn module_started(&mut self, _index: usize, _total: usize, _module: &str) {}
    fn module_finished(&mut self, _index: usize, _total: usize, _record: &ModuleRecord) {}
}

impl RunObserver for () {}

/// Results of a full orchestration pass, in ranked order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestrationOutcome {
    pub records: Vec<ModuleRecord>,
}

impl OrchestrationOutcome {
    /// Simplified `(module, status)` list.
    pub fn statuses(&self) -> Vec<ModuleStatusEntry> {
        self.records
            .iter()
            .map(|r| ModuleStatusEntry {
                module: r.result.module.clone(),
                status: r.status,
            })
            .collect()
    }

    /// Full dual results.
    pub fn details(&self) -> Vec<DualTestResult> {
        self.records.iter().map(|r| r.result.clone()).collect()
    }

    /// Write `results.json` and `detailed_results.json` into `workspace`.
    pub fn persist(&self, workspace: &Workspace) -> Result<(PathBuf, PathBuf), RunnerError> {
        let results = workspace.write_results(&self.statuses())?;
        let detailed = workspace.write_detailed_results(&self.details())?;
        Ok((results, detailed))
    }
}

/// Drives the executor over each ranked module.
pub struct Orchestrator<E> {
    executor: E,
    target: RunTarget,
}

impl<E: TestExecutor> Orchestrator<E> {
    pub fn new(executor: E, target: RunTarget) -> Self {
        Self { executor, target }
    }

    pub fn target(&self) -> &RunTarget {
        &self.target
    }

    /// Test every module in order. Never fails at the pass level.
    pub async fn run<O: RunObserver + ?Sized>(
        &self,
        modules: &[String],
        observer: &mut O,
    ) -> OrchestrationOutcome {
        let total = modules.len();
        let mut outcome = OrchestrationOutcome {
            records: Vec::with_capacity(total),
        };

        for (i, module) in modules.iter().enumerate() {
            let index = i + 1;
            observer.module_started(index, total, module);
            let record = self.run_module(module).await;
            emit_module_tested(index, total, module, record.status.as_str());
            observer.module_finished(index, total, &record);
            outcome.records.push(record);
        }

        info!("Tested {} modules", total);
        outcome
    }

    async fn run_module(&self, module: &str) -> ModuleRecord {
        let request = self.target.request(module);
        match self.executor.execute(&request).await {
            Ok(mut result) => {
                backfill(&mut result, &request);
                ModuleRecord {
                    status: classify(&result),
                    result,
                    invocation_error: None,
                }
            }
            Err(e) => {
                emit_invocation_failed(module, &e);
                let message = e.to_string();
                ModuleRecord {
                    status: ModuleStatus::Error,
                    result: DualTestResult {
                        module: module.to_string(),
                        base: RefOutcome::failed(&request.base_ref, &message),
                        head: RefOutcome::failed(&request.head_ref, &message),
                    },
                    invocation_error: Some(message),
                }
            }
        }
    }
}

/// Fill identifiers the executor left empty from the request.
fn backfill(result: &mut DualTestResult, request: &ExecutionRequest) {
    if result.module.is_empty() {
        result.module = request.module.clone();
    }
    if result.base.git_ref.is_empty() {
        result.base.git_ref = request.base_ref.clone();
    }
    if result.head.git_ref.is_empty() {
        result.head.git_ref = request.head_ref.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backfill_only_touches_empty_fields() {
        let request = RunTarget::new("github.com/acme/lib", "main", "HEAD").request("github.com/a/b");
        let mut result = DualTestResult {
            module: String::new(),
            base: RefOutcome::passed("v1.0.0"),
            head: RefOutcome::passed(""),
        };
        backfill(&mut result, &request);
        assert_eq!(result.module, "github.com/a/b");
        assert_eq!(result.base.git_ref, "v1.0.0");
        assert_eq!(result.head.git_ref, "HEAD");
    }
}
