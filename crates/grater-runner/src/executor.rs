//! Test executor contract and its container-backed implementation.
//!
//! One invocation runs a consumer's tests against both library refs and
//! emits a single JSON document:
//! `{ module, base: {ref, passed, error, skipped}, head: {...} }`.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use grater_core::DualTestResult;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ExecutorInvocationError, RunnerError};

/// Longest slice of process output kept in an error message.
const MAX_ERROR_OUTPUT: usize = 4096;

/// Parameters of one dual-ref test invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub module: String,
    pub repo: String,
    pub base_ref: String,
    pub head_ref: String,
}

impl ExecutionRequest {
    /// Environment passed to the executor process.
    pub fn env(&self) -> [(&'static str, &str); 4] {
        [
            ("MODULE", self.module.as_str()),
            ("REPO", self.repo.as_str()),
            ("BASE_REF", self.base_ref.as_str()),
            ("HEAD_REF", self.head_ref.as_str()),
        ]
    }
}

/// Runs one consumer's test suite against base and head.
#[async_trait]
pub trait TestExecutor: Send + Sync {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<DualTestResult, ExecutorInvocationError>;
}

fn tail(text: &str) -> String {
    let text = text.trim();
    if text.len() <= MAX_ERROR_OUTPUT {
        return text.to_string();
    }
    let mut start = text.len() - MAX_ERROR_OUTPUT;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

/// Decode the executor's single JSON document.
pub fn parse_payload(stdout: &str) -> Result<DualTestResult, ExecutorInvocationError> {
    serde_json::from_str(stdout.trim()).map_err(|e| ExecutorInvocationError::InvalidPayload {
        reason: e.to_string(),
        output: tail(stdout),
    })
}

/// Executor that runs the test image with `docker run --rm`.
#[derive(Debug, Clone)]
pub struct DockerExecutor {
    /// Container CLI binary.
    pub program: PathBuf,
    pub image: String,
}

impl DockerExecutor {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from("docker"),
            image: image.into(),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Arguments of `docker run` for `request`.
    pub fn run_args(&self, request: &ExecutionRequest) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];
        for (key, value) in request.env() {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push(self.image.clone());
        args
    }

    /// Build the executor image, streaming build output to the console.
    pub async fn build_image(&self, dockerfile: &Path, context: &Path) -> Result<(), RunnerError> {
        info!("Building image {} from {:?}", self.image, dockerfile);
        let status = Command::new(&self.program)
            .arg("build")
            .arg("-t")
            .arg(&self.image)
            .arg("-f")
            .arg(dockerfile)
            .arg(context)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| RunnerError::ImageBuild(format!("failed to start build: {e}")))?;

        if !status.success() {
            return Err(RunnerError::ImageBuild(format!(
                "build of {} exited with {:?}",
                self.image,
                status.code()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl TestExecutor for DockerExecutor {
    async fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<DualTestResult, ExecutorInvocationError> {
        debug!("Invoking executor for {}", request.module);
        let output = Command::new(&self.program)
            .args(self.run_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ExecutorInvocationError::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExecutorInvocationError::NonZeroExit {
                code: output.status.code(),
                output: tail(&format!("{stdout}{stderr}")),
            });
        }
        parse_payload(&stdout)
    }
}
