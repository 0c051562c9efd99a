use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::ScoreStore;
use crate::domain::{CandidateProject, GraterError, Result};

/// JSON-file-backed score cache (`{"github.com/o/r": 7.4, ...}`).
///
/// Loaded once on open and written back whole on [`ScoreStore::flush`].
/// There is no merge against concurrent writers of the same file.
pub struct FsScoreStore {
    path: PathBuf,
    scores: HashMap<CandidateProject, f64>,
}

impl FsScoreStore {
    /// Open the cache at `path`.
    ///
    /// A missing file starts an empty cache. An unreadable or malformed file
    /// is logged and also starts empty; it is replaced on the next flush.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let scores = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, f64>>(&bytes) {
                Ok(raw) => raw
                    .into_iter()
                    .map(|(k, v)| (CandidateProject::new(k), v))
                    .collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "score cache is malformed; starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "score cache unreadable; starting empty");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), entries = scores.len(), "score cache loaded");
        Self { path, scores }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist_error(&self, reason: impl ToString) -> GraterError {
        GraterError::CachePersist {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ScoreStore for FsScoreStore {
    fn get(&self, project: &CandidateProject) -> Option<f64> {
        self.scores.get(project).copied()
    }

    fn set(&mut self, project: &CandidateProject, score: f64) {
        self.scores.insert(project.clone(), score);
    }

    fn flush(&self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.persist_error(e))?;

        let raw: HashMap<&str, f64> = self
            .scores
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        let content = serde_json::to_vec_pretty(&raw).map_err(|e| self.persist_error(e))?;

        // Atomic write: temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.persist_error(e))?;
        tmp.write_all(&content).map_err(|e| self.persist_error(e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.persist_error(e.error))?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.scores.len()
    }
}
