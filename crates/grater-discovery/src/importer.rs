//! Importer source: who imports a given library.
//!
//! [`PkgGoDevImporter`] scrapes the "imported by" tab of a Go package index.
//! The page format is an external contract outside our control; extraction
//! is isolated in [`extract_import_paths`] so it can be tested offline.

use std::time::Duration;

use async_trait::async_trait;
use grater_core::{CandidateProject, RECOGNIZED_HOST};
use regex::Regex;
use tracing::{debug, info};

use crate::dedup::dedupe_candidates;
use crate::error::{DiscoveryError, DiscoveryResult};

/// Marker present on every "imported by" listing page.
const LISTING_MARKER: &str = "ImportedBy";
/// Container of the importer anchors.
const DETAILS_MARKER: &str = "ImportedBy-details";

/// Source of downstream consumers for a library.
#[async_trait]
pub trait ImporterSource: Send + Sync {
    /// Deduplicated, lower-cased root projects importing `library`, in
    /// discovery order. An empty list is not an error.
    async fn fetch_importers(&self, library: &str) -> DiscoveryResult<Vec<CandidateProject>>;
}

/// Importer source backed by a pkg.go.dev-style package index.
pub struct PkgGoDevImporter {
    base_url: String,
    http_client: reqwest::Client,
}

impl PkgGoDevImporter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> DiscoveryResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("grater/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::ClientBuild(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn listing_url(&self, library: &str) -> String {
        format!("{}/{}?tab=importedby", self.base_url, library)
    }
}

#[async_trait]
impl ImporterSource for PkgGoDevImporter {
    async fn fetch_importers(&self, library: &str) -> DiscoveryResult<Vec<CandidateProject>> {
        let url = self.listing_url(library);
        info!("Fetching importers for {}", library);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| DiscoveryError::Fetch {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| DiscoveryError::Fetch {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let raw = extract_import_paths(&body)?;
        debug!("Extracted {} raw importer paths", raw.len());
        let roots = dedupe_candidates(raw);
        info!("Found {} unique projects", roots.len());
        Ok(roots)
    }
}

/// Inner HTML of the element whose class list holds [`DETAILS_MARKER`].
///
/// Nested elements of the same tag are balanced so the slice ends at the
/// container's own closing tag; an unterminated container runs to the end.
fn details_container(html: &str) -> DiscoveryResult<Option<&str>> {
    let opening = Regex::new(&format!(
        r#"(?i)<([a-z][a-z0-9]*)\b[^>]*\bclass\s*=\s*["'][^"']*\b{}\b[^"']*["'][^>]*>"#,
        regex::escape(DETAILS_MARKER)
    ))
    .map_err(|e| DiscoveryError::Parse(e.to_string()))?;
    let Some(caps) = opening.captures(html) else {
        return Ok(None);
    };
    let (Some(open), Some(name)) = (caps.get(0), caps.get(1)) else {
        return Ok(None);
    };

    let body = &html[open.end()..];
    let same_tag = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(name.as_str())))
        .map_err(|e| DiscoveryError::Parse(e.to_string()))?;
    let mut depth = 1usize;
    for tag in same_tag.captures_iter(body) {
        let (Some(whole), Some(slash)) = (tag.get(0), tag.get(1)) else {
            continue;
        };
        if slash.as_str().is_empty() {
            if !whole.as_str().ends_with("/>") {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Ok(Some(&body[..whole.start()]));
            }
        }
    }
    Ok(Some(body))
}

/// Pull import paths on the recognized host out of an "imported by" page.
///
/// Only anchors inside the details container are considered. The anchor
/// text is matched case-insensitively against `github.com/`.
pub fn extract_import_paths(html: &str) -> DiscoveryResult<Vec<String>> {
    if !html.contains(LISTING_MARKER) {
        return Err(DiscoveryError::Parse(
            "page is not an imported-by listing".to_string(),
        ));
    }
    let Some(details) = details_container(html)? else {
        return Ok(Vec::new());
    };

    let anchor = Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>")
        .map_err(|e| DiscoveryError::Parse(e.to_string()))?;
    let inner_tag =
        Regex::new(r"(?s)<[^>]*>").map_err(|e| DiscoveryError::Parse(e.to_string()))?;
    let prefix = format!("{RECOGNIZED_HOST}/");

    let paths = anchor
        .captures_iter(details)
        .filter_map(|caps| caps.get(1))
        .map(|m| inner_tag.replace_all(m.as_str(), "").trim().to_string())
        .filter(|text| {
            text.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(&prefix))
        })
        .collect();
    Ok(paths)
}
