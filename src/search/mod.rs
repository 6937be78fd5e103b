/// Search indexes over the chapter catalog
///
/// Two interchangeable backends sit behind [`SearchIndex`]: a weighted fuzzy
/// matcher that reports character spans per field, and a token index with
/// prefix and stem expansion that only reports which tokens matched.

pub mod fuzzy;
pub mod terms;

pub use fuzzy::FuzzyIndex;
pub use terms::TermIndex;

use crate::catalog::Catalog;
use crate::config::{ChapterField, SearchBackend, SearchConfig};
use crate::excerpt::MatchSpan;
use serde::Serialize;
use tracing::info;

/// Spans located in one field of a chapter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldMatch {
    pub field: ChapterField,
    pub spans: Vec<MatchSpan>,
}

/// Positional data reported with a hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MatchData {
    /// Per-field character spans
    Fields(Vec<FieldMatch>),
    /// Document tokens that matched
    Terms(Vec<String>),
    /// No positional data
    None,
}

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Position of the chapter in the catalog
    pub chapter: usize,
    pub score: f64,
    pub matches: MatchData,
}

/// Query interface shared by the index backends
pub trait SearchIndex: Send + Sync {
    /// Ranked hits for a non-empty query. `filter` receives catalog positions.
    fn search(&self, query: &str, filter: &dyn Fn(usize) -> bool) -> Vec<SearchHit>;

    fn backend(&self) -> SearchBackend;
}

/// Build the index selected by the configuration
pub fn build_index(catalog: &Catalog, config: &SearchConfig) -> Box<dyn SearchIndex> {
    let index: Box<dyn SearchIndex> = match config.backend {
        SearchBackend::Fuzzy => Box::new(FuzzyIndex::build(catalog, config)),
        SearchBackend::Terms => Box::new(TermIndex::build(catalog, config)),
    };
    info!("🔍 Built {:?} index over {} chapters", config.backend, catalog.len());
    index
}

/// Sort by descending score, keeping catalog order for ties
pub(crate) fn rank(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}
