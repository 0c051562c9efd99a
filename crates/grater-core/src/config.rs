//! Runtime configuration with environment-variable overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{GraterError, Result};

pub const DEFAULT_WORKSPACE: &str = ".grater";
pub const DEFAULT_IMPORTER_URL: &str = "https://pkg.go.dev";
pub const DEFAULT_SCORECARD_URL: &str = "https://api.securityscorecards.dev";
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 50;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_IMAGE: &str = "grater-runner";

/// Grater configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraterConfig {
    /// Directory holding modules, cache and results artifacts
    pub workspace: PathBuf,
    /// Base URL of the package index serving "imported by" pages
    pub importer_url: String,
    /// Base URL of the scoring API
    pub scorecard_url: String,
    /// Number of concurrent scoring workers
    pub concurrency: usize,
    /// Per-worker pause after each scoring call, in milliseconds
    pub request_delay_ms: u64,
    /// Timeout for each HTTP request, in seconds
    pub http_timeout_secs: u64,
    /// Container image of the test executor
    pub image: String,
}

impl Default for GraterConfig {
    fn default() -> Self {
        GraterConfig {
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            importer_url: DEFAULT_IMPORTER_URL.to_string(),
            scorecard_url: DEFAULT_SCORECARD_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GraterError::InvalidConfig(format!("{key} has invalid value {raw:?}"))),
        Err(_) => Ok(None),
    }
}

impl GraterConfig {
    /// Defaults overridden by `GRATER_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("GRATER_WORKSPACE") {
            config.workspace = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("GRATER_IMPORTER_URL") {
            config.importer_url = v;
        }
        if let Ok(v) = std::env::var("GRATER_SCORECARD_URL") {
            config.scorecard_url = v;
        }
        if let Some(v) = env_parse("GRATER_CONCURRENCY")? {
            config.concurrency = v;
        }
        if let Some(v) = env_parse("GRATER_REQUEST_DELAY_MS")? {
            config.request_delay_ms = v;
        }
        if let Some(v) = env_parse("GRATER_HTTP_TIMEOUT_SECS")? {
            config.http_timeout_secs = v;
        }
        if let Ok(v) = std::env::var("GRATER_IMAGE") {
            config.image = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(GraterError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(GraterError::InvalidConfig(
                "http timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GraterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.request_delay(), Duration::from_millis(50));
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let config = GraterConfig {
            concurrency: 0,
            ..GraterConfig::default()
        };
        assert!(matches!(config.validate(), Err(GraterError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = GraterConfig {
            http_timeout_secs: 0,
            ..GraterConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
