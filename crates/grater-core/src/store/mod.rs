//! Persistent score cache behind a swappable store interface.

pub mod fs;
pub mod memory;

use crate::domain::{CandidateProject, Result};

pub use fs::FsScoreStore;
pub use memory::MemoryScoreStore;

/// Score cache keyed by root project.
///
/// A stored score of `0.0` is treated by callers as a miss.
pub trait ScoreStore: Send {
    /// Cached score for `project`, if any.
    fn get(&self, project: &CandidateProject) -> Option<f64>;

    /// Record a score. Last write wins.
    fn set(&mut self, project: &CandidateProject, score: f64);

    /// Persist pending updates.
    fn flush(&self) -> Result<()>;

    /// Number of cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
