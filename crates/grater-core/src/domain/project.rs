//! Candidate consumer projects and their ranked form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host prefix of import paths that can be resolved to a root project.
pub const RECOGNIZED_HOST: &str = "github.com";

/// A downstream consumer identified as `host/owner/repo`.
///
/// Identifiers are lower-cased on construction, so equality and hashing are
/// case-insensitive with respect to the raw discovered text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateProject(String);

impl CandidateProject {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(path.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `(owner, repo)` when the identifier is exactly `host/owner/repo`
    /// on the recognized host.
    pub fn owner_repo(&self) -> Option<(&str, &str)> {
        let mut parts = self.0.split('/');
        let host = parts.next()?;
        let owner = parts.next()?;
        let repo = parts.next()?;
        if host != RECOGNIZED_HOST || owner.is_empty() || repo.is_empty() || parts.next().is_some()
        {
            return None;
        }
        Some((owner, repo))
    }
}

impl fmt::Display for CandidateProject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CandidateProject {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A scored consumer in the ranked output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedModule {
    pub path: CandidateProject,
    /// External trust score; `0.0` means unknown or unfetched.
    pub score: f64,
}
