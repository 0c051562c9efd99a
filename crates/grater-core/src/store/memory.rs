use std::collections::HashMap;

use super::ScoreStore;
use crate::domain::{CandidateProject, Result};

/// In-memory score store. `flush` is a no-op.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    scores: HashMap<CandidateProject, f64>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, f64)>,
        P: AsRef<str>,
    {
        Self {
            scores: entries
                .into_iter()
                .map(|(p, s)| (CandidateProject::new(p), s))
                .collect(),
        }
    }
}

impl ScoreStore for MemoryScoreStore {
    fn get(&self, project: &CandidateProject) -> Option<f64> {
        self.scores.get(project).copied()
    }

    fn set(&mut self, project: &CandidateProject, score: f64) {
        self.scores.insert(project.clone(), score);
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn len(&self) -> usize {
        self.scores.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut store = MemoryScoreStore::with_scores([("github.com/a/b", 1.0)]);
        let key = CandidateProject::new("github.com/a/b");
        store.set(&key, 7.5);
        assert_eq!(store.get(&key), Some(7.5));
        assert_eq!(store.len(), 1);
    }
}
