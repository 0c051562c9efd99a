//! Library identifier normalization and origin detection.

use std::path::Path;
use std::process::Command;

use crate::error::{DiscoveryError, DiscoveryResult};

/// Reduce a repository URL to a `host/owner/repo` library identifier.
///
/// Strips a trailing `.git`, the `https://`/`http://` scheme, and rewrites
/// scp-style `git@host:owner/repo` remotes.
pub fn clean_repo_url(url: &str) -> String {
    let mut url = url.trim();
    url = url.strip_suffix(".git").unwrap_or(url);
    url = url.strip_prefix("https://").unwrap_or(url);
    url = url.strip_prefix("http://").unwrap_or(url);
    match url.strip_prefix("git@") {
        Some(rest) => rest.replacen(':', "/", 1),
        None => url.to_string(),
    }
}

/// Read the `origin` remote URL of the git repository at `dir`.
pub fn detect_origin(dir: &Path) -> DiscoveryResult<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .map_err(|e| DiscoveryError::OriginLookup(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiscoveryError::OriginLookup(format!(
            "git remote get-url origin failed: {}",
            stderr.trim()
        )));
    }

    let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if url.is_empty() {
        return Err(DiscoveryError::OriginLookup(
            "git remote get-url origin returned empty output".to_string(),
        ));
    }
    Ok(url)
}

/// The explicit `repo` if given, else the `origin` remote of `dir`, cleaned.
pub fn resolve_library(repo: Option<&str>, dir: &Path) -> DiscoveryResult<String> {
    let raw = match repo.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => r.to_string(),
        None => detect_origin(dir)?,
    };
    Ok(clean_repo_url(&raw))
}
