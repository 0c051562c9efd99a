//! Error taxonomy for pass-level failures in Grater.

use std::path::PathBuf;

/// Grater domain errors.
#[derive(Debug, thiserror::Error)]
pub enum GraterError {
    /// Persisted results could not be decoded. Fatal to the report command only.
    #[error("failed to parse results at {path:?}: {source}")]
    ReportParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required artifact is missing from the workspace.
    #[error("artifact not found at {path:?}; {hint}")]
    ArtifactMissing { path: PathBuf, hint: String },

    #[error("failed to persist score cache to {path:?}: {reason}")]
    CachePersist { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Grater core operations.
pub type Result<T> = std::result::Result<T, GraterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_parse_error_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = GraterError::ReportParse {
            path: PathBuf::from(".grater/detailed_results.json"),
            source,
        };
        let msg = err.to_string();
        assert!(msg.contains("failed to parse results"));
        assert!(msg.contains("detailed_results.json"));
    }

    #[test]
    fn test_artifact_missing_carries_hint() {
        let err = GraterError::ArtifactMissing {
            path: PathBuf::from(".grater/modules.txt"),
            hint: "run `grater find` first".to_string(),
        };
        assert!(err.to_string().contains("grater find"));
    }

    #[test]
    fn test_invalid_config_error() {
        let err = GraterError::InvalidConfig("concurrency must be at least 1".to_string());
        assert!(err.to_string().contains("invalid configuration"));
        assert!(err.to_string().contains("concurrency"));
    }
}
