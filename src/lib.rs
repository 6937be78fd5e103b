/// Lecture Search - Rust Implementation
///
/// Search-as-you-type over a catalog of lecture chapters: fuzzy or term
/// matching, highlighted transcript excerpts and HTML result rendering.

pub mod catalog;
pub mod config;
pub mod debounce;
pub mod error;
pub mod excerpt;
pub mod render;
pub mod search;
pub mod session;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::catalog::{Catalog, CatalogSource, Chapter};
pub use crate::config::{ChapterField, Config, ConfigBuilder, SearchBackend};
pub use crate::debounce::Debouncer;
pub use crate::error::{LectureSearchError, Result};
pub use crate::excerpt::{Excerpt, ExcerptExtractor, MatchEvidence, MatchSpan};
pub use crate::render::{render_empty_state, render_load_error, render_result, render_results, render_stats};
pub use crate::search::{build_index, SearchHit, SearchIndex};
pub use crate::session::{ChapterFilter, RenderedPage, SearchOutcome, SearchRequest, SearchSession};
