//! Per-module test outcomes as reported by the test executor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of one consumer test run against a single library ref.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefOutcome {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub skipped: bool,
}

impl RefOutcome {
    pub fn passed(git_ref: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            passed: true,
            ..Self::default()
        }
    }

    pub fn failed(git_ref: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            passed: false,
            error: error.into(),
            skipped: false,
        }
    }

    pub fn skipped(git_ref: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            git_ref: git_ref.into(),
            passed: false,
            error: reason.into(),
            skipped: true,
        }
    }

    /// A failing outcome that carries an explicit error signal.
    pub fn failed_with_error(&self) -> bool {
        !self.passed && !self.error.is_empty()
    }
}

/// Paired base/head outcome for one consumer module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualTestResult {
    pub module: String,
    pub base: RefOutcome,
    pub head: RefOutcome,
}

/// Classification of a single module's dual result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleStatus {
    Pass,
    Regression,
    Fixed,
    Broken,
    Skipped,
    Error,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Pass => "PASS",
            ModuleStatus::Regression => "REGRESSION",
            ModuleStatus::Fixed => "FIXED",
            ModuleStatus::Broken => "BROKEN",
            ModuleStatus::Skipped => "SKIPPED",
            ModuleStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASS" => Ok(ModuleStatus::Pass),
            "REGRESSION" => Ok(ModuleStatus::Regression),
            "FIXED" => Ok(ModuleStatus::Fixed),
            "BROKEN" => Ok(ModuleStatus::Broken),
            "SKIPPED" => Ok(ModuleStatus::Skipped),
            "ERROR" => Ok(ModuleStatus::Error),
            other => Err(format!("unknown module status: {other}")),
        }
    }
}

/// Entry in the simplified `results.json` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleStatusEntry {
    pub module: String,
    pub status: ModuleStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_result_decodes_executor_payload() {
        let raw = r#"{
            "module": "github.com/a/b",
            "base": {"ref": "main", "passed": true, "error": "", "skipped": false},
            "head": {"ref": "HEAD", "passed": false, "error": "panic", "skipped": false}
        }"#;
        let r: DualTestResult = serde_json::from_str(raw).unwrap();
        assert_eq!(r.base.git_ref, "main");
        assert!(r.base.passed);
        assert_eq!(r.head.error, "panic");
        assert!(r.head.failed_with_error());
    }

    #[test]
    fn test_ref_outcome_missing_fields_default() {
        let o: RefOutcome = serde_json::from_str(r#"{"passed": true}"#).unwrap();
        assert!(o.passed);
        assert!(o.git_ref.is_empty());
        assert!(!o.skipped);
    }

    #[test]
    fn test_ref_field_keeps_wire_name() {
        let v = serde_json::to_value(RefOutcome::passed("v1.2.0")).unwrap();
        assert_eq!(v["ref"], "v1.2.0");
        assert!(v.get("git_ref").is_none());
    }

    #[test]
    fn test_module_status_wire_names() {
        let entry = ModuleStatusEntry {
            module: "github.com/a/b".to_string(),
            status: ModuleStatus::Regression,
        };
        let v = serde_json::to_value(&entry).unwrap();
        assert_eq!(v["status"], "REGRESSION");
        assert_eq!("SKIPPED".parse::<ModuleStatus>(), Ok(ModuleStatus::Skipped));
        assert!("nope".parse::<ModuleStatus>().is_err());
    }
}
