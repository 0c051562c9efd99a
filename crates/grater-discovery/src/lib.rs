//! Grater Discovery - who depends on the library, ranked by trust score
//!
//! Provides:
//! - [`importer::ImporterSource`] / [`importer::PkgGoDevImporter`]: consumer discovery
//! - [`dedup`]: root-project normalization and first-seen deduplication
//! - [`scorecard::ScoreFetcher`] / [`scorecard::ScorecardClient`]: external scoring
//! - [`ranking::RankingEngine`]: bounded concurrent scoring, stable ranking, limit

pub mod dedup;
pub mod error;
pub mod importer;
pub mod normalize;
pub mod ranking;
pub mod scorecard;

use grater_core::ScoreStore;
use tracing::info;

pub use dedup::{dedupe_candidates, root_project};
pub use error::{DiscoveryError, DiscoveryResult, ScoreFetchError};
pub use importer::{extract_import_paths, ImporterSource, PkgGoDevImporter};
pub use normalize::{clean_repo_url, detect_origin, resolve_library};
pub use ranking::{RankingConfig, RankingEngine, RankingOutcome};
pub use scorecard::{ScoreFetcher, ScoreFetcherFactory, ScorecardClient, ScorecardFactory};

/// Full ranking pass: discover importers of `library`, then score and rank them.
///
/// A discovery failure aborts the pass before any scoring happens.
pub async fn discover_and_rank<I, F, S>(
    importer: &I,
    engine: &RankingEngine<F>,
    library: &str,
    store: &mut S,
) -> DiscoveryResult<RankingOutcome>
where
    I: ImporterSource + ?Sized,
    F: ScoreFetcherFactory,
    S: ScoreStore,
{
    let candidates = importer.fetch_importers(library).await?;
    if candidates.is_empty() {
        info!("No importers found for {}", library);
    }
    engine.rank(candidates, store).await
}
