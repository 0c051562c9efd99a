//! On-disk workspace holding the artifacts shared between passes.
//!
//! Layout (default root `.grater`):
//! - `modules.txt`: newline-delimited ranked module list (find → run)
//! - `cache.json`: score cache (find)
//! - `results.json`: simplified `(module, status)` list (run)
//! - `detailed_results.json`: full dual results (run → report)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{DualTestResult, GraterError, ModuleStatusEntry, Result};

pub const MODULES_FILE: &str = "modules.txt";
pub const CACHE_FILE: &str = "cache.json";
pub const RESULTS_FILE: &str = "results.json";
pub const DETAILED_RESULTS_FILE: &str = "detailed_results.json";

/// Handle to a Grater workspace directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the workspace directory if needed.
    pub fn ensure(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Open a workspace without touching the filesystem.
    pub fn at(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules_path(&self) -> PathBuf {
        self.root.join(MODULES_FILE)
    }

    pub fn cache_path(&self) -> PathBuf {
        self.root.join(CACHE_FILE)
    }

    pub fn results_path(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }

    pub fn detailed_results_path(&self) -> PathBuf {
        self.root.join(DETAILED_RESULTS_FILE)
    }

    /// Write the ranked module list, one identifier per line.
    pub fn write_modules<S: AsRef<str>>(&self, modules: &[S]) -> Result<PathBuf> {
        let mut content = modules
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        if !modules.is_empty() {
            content.push('\n');
        }
        let path = self.modules_path();
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Write an empty module list unless one already exists.
    ///
    /// Returns `true` when a new file was created.
    pub fn init_modules(&self) -> Result<bool> {
        let path = self.modules_path();
        if path.exists() {
            return Ok(false);
        }
        fs::write(&path, "")?;
        Ok(true)
    }

    /// Read the ranked module list, skipping blank lines.
    pub fn read_modules(&self) -> Result<Vec<String>> {
        let path = self.modules_path();
        let data = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GraterError::ArtifactMissing {
                    path: path.clone(),
                    hint: "run `grater find` first".to_string(),
                }
            } else {
                GraterError::Io(e)
            }
        })?;
        Ok(data
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn write_results(&self, entries: &[ModuleStatusEntry]) -> Result<PathBuf> {
        let path = self.results_path();
        write_json(&path, entries)?;
        Ok(path)
    }

    pub fn write_detailed_results(&self, results: &[DualTestResult]) -> Result<PathBuf> {
        let path = self.detailed_results_path();
        write_json(&path, results)?;
        Ok(path)
    }

    /// Read the detailed results written by the run pass.
    ///
    /// Accepts either a JSON array of dual results or a single dual-result
    /// object.
    pub fn read_detailed_results(&self) -> Result<Vec<DualTestResult>> {
        let path = self.detailed_results_path();
        let data = fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GraterError::ArtifactMissing {
                    path: path.clone(),
                    hint: "run `grater run` first".to_string(),
                }
            } else {
                GraterError::Io(e)
            }
        })?;
        parse_detailed_results(&data).map_err(|source| GraterError::ReportParse { path, source })
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}

fn parse_detailed_results(data: &[u8]) -> serde_json::Result<Vec<DualTestResult>> {
    match serde_json::from_slice::<Vec<DualTestResult>>(data) {
        Ok(results) => Ok(results),
        Err(list_err) => serde_json::from_slice::<DualTestResult>(data)
            .map(|single| vec![single])
            .map_err(|_| list_err),
    }
}
