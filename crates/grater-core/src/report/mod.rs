//! Aggregation of classified modules into a single release verdict.
//!
//! [`ReportSummary::from_results`] partitions dual results into six buckets
//! using [`crate::classify`] and derives the overall [`Verdict`]. Rendering
//! lives in [`render`].

pub mod render;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::classify;
use crate::domain::{DualTestResult, ModuleStatus};

pub use render::{render_human, render_json};

/// Overall safety classification of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Safe,
    Unsafe,
    Inconclusive,
    Broken,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "SAFE",
            Verdict::Unsafe => "UNSAFE",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::Broken => "BROKEN",
        }
    }

    /// Only `Unsafe` gates a release; callers map it to a non-zero exit.
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Unsafe)
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_failure() {
            1
        } else {
            0
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorized report for one base/head comparison.
///
/// Buckets keep the order in which modules were classified (ranked order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_modules: usize,
    pub base_ref: String,
    pub head_ref: String,
    pub status: Verdict,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regressions: Vec<DualTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed: Vec<DualTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broken: Vec<DualTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<DualTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passed: Vec<DualTestResult>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<DualTestResult>,
}

impl ReportSummary {
    /// Classify every result and compute the overall verdict.
    ///
    /// Ref labels are taken from the first result; an empty input yields
    /// `Inconclusive` since nothing was verified.
    pub fn from_results(results: &[DualTestResult]) -> Self {
        let mut summary = ReportSummary {
            total_modules: results.len(),
            base_ref: String::new(),
            head_ref: String::new(),
            status: Verdict::Inconclusive,
            generated_at: Utc::now(),
            regressions: Vec::new(),
            fixed: Vec::new(),
            broken: Vec::new(),
            skipped: Vec::new(),
            passed: Vec::new(),
            errors: Vec::new(),
        };

        let Some(first) = results.first() else {
            return summary;
        };
        summary.base_ref = first.base.git_ref.clone();
        summary.head_ref = first.head.git_ref.clone();

        for result in results {
            summary.bucket_mut(classify(result)).push(result.clone());
        }

        summary.status = summary.compute_verdict();
        summary
    }

    fn bucket_mut(&mut self, status: ModuleStatus) -> &mut Vec<DualTestResult> {
        match status {
            ModuleStatus::Pass => &mut self.passed,
            ModuleStatus::Regression => &mut self.regressions,
            ModuleStatus::Fixed => &mut self.fixed,
            ModuleStatus::Broken => &mut self.broken,
            ModuleStatus::Skipped => &mut self.skipped,
            ModuleStatus::Error => &mut self.errors,
        }
    }

    /// Modules in the bucket for `status`.
    pub fn bucket(&self, status: ModuleStatus) -> &[DualTestResult] {
        match status {
            ModuleStatus::Pass => &self.passed,
            ModuleStatus::Regression => &self.regressions,
            ModuleStatus::Fixed => &self.fixed,
            ModuleStatus::Broken => &self.broken,
            ModuleStatus::Skipped => &self.skipped,
            ModuleStatus::Error => &self.errors,
        }
    }

    fn compute_verdict(&self) -> Verdict {
        if self.total_modules == 0 {
            Verdict::Inconclusive
        } else if !self.regressions.is_empty() {
            Verdict::Unsafe
        } else if !self.errors.is_empty() {
            Verdict::Inconclusive
        } else if self.broken.len() == self.total_modules {
            Verdict::Broken
        } else {
            Verdict::Safe
        }
    }
}
