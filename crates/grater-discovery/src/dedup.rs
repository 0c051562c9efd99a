//! Candidate deduplication at root-project granularity.

use std::collections::HashSet;

use grater_core::{CandidateProject, RECOGNIZED_HOST};

/// Strip an import path to its root project.
///
/// `github.com/o/r/sub/pkg` becomes `github.com/o/r`; paths on other hosts
/// are returned unchanged.
pub fn root_project(path: &str) -> &str {
    let mut segments = path.splitn(4, '/');
    let host = segments.next().unwrap_or_default();
    if !host.eq_ignore_ascii_case(RECOGNIZED_HOST) {
        return path;
    }
    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(repo), Some(_)) => {
            let end = host.len() + 1 + owner.len() + 1 + repo.len();
            &path[..end]
        }
        _ => path,
    }
}

/// Normalize raw candidates to root projects, keeping the first occurrence
/// of each (case-insensitively) in discovery order.
pub fn dedupe_candidates<I, S>(raw: I) -> Vec<CandidateProject>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for path in raw {
        let project = CandidateProject::new(root_project(path.as_ref().trim()));
        if project.as_str().is_empty() {
            continue;
        }
        if seen.insert(project.clone()) {
            out.push(project);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(v: &[CandidateProject]) -> Vec<&str> {
        v.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let out = dedupe_candidates(["github.com/a/b", "github.com/a/b", "github.com/c/d"]);
        assert_eq!(paths(&out), vec!["github.com/a/b", "github.com/c/d"]);
    }

    #[test]
    fn test_subpackages_collapse_to_root_in_first_seen_order() {
        let out = dedupe_candidates([
            "github.com/x/y/cmd/tool",
            "github.com/a/b",
            "GitHub.com/X/Y/internal",
        ]);
        assert_eq!(paths(&out), vec!["github.com/x/y", "github.com/a/b"]);
    }

    #[test]
    fn test_root_project_leaves_other_hosts() {
        assert_eq!(root_project("gitlab.com/a/b/c"), "gitlab.com/a/b/c");
        assert_eq!(root_project("github.com/a/b"), "github.com/a/b");
        assert_eq!(root_project("github.com/a/b/c/d"), "github.com/a/b");
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert!(dedupe_candidates(Vec::<String>::new()).is_empty());
    }
}
