//! Search session: the catalog, its index and the render pipeline
use crate::catalog::{Catalog, Chapter};
use crate::config::{ChapterField, Config};
use crate::excerpt::{ExcerptExtractor, MatchEvidence};
use crate::render::{render_results, render_stats};
use crate::search::{build_index, MatchData, SearchHit, SearchIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Course and semester checkboxes. `None` means everything is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterFilter {
    pub courses: Option<BTreeSet<String>>,
    pub semesters: Option<BTreeSet<String>>,
}

impl ChapterFilter {
    /// Filter with everything enabled
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_courses<I, S>(mut self, courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.courses = Some(courses.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_semesters<I, S>(mut self, semesters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.semesters = Some(semesters.into_iter().map(Into::into).collect());
        self
    }

    /// A chapter without a semester fails an active semester filter
    pub fn matches(&self, chapter: &Chapter) -> bool {
        let course_ok = self
            .courses
            .as_ref()
            .map_or(true, |courses| courses.contains(&chapter.course));
        let semester_ok = self.semesters.as_ref().map_or(true, |semesters| {
            chapter
                .semester
                .as_ref()
                .map_or(false, |semester| semesters.contains(semester))
        });
        course_ok && semester_ok
    }

    /// Whether every chapter of the catalog passes this filter.
    /// An active semester filter always hides chapters without a semester.
    pub fn is_unrestricted(&self, catalog: &Catalog) -> bool {
        let covers = |enabled: &Option<BTreeSet<String>>, known: Vec<String>| {
            enabled
                .as_ref()
                .map_or(true, |set| known.iter().all(|k| set.contains(k)))
        };
        let undated = self.semesters.is_some() && catalog.iter().any(|c| c.semester.is_none());
        !undated && covers(&self.courses, catalog.courses()) && covers(&self.semesters, catalog.semesters())
    }
}

/// A query plus the filter state at the time it was issued
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub filter: ChapterFilter,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filter: ChapterFilter) -> Self {
        Self {
            query: query.into(),
            filter,
        }
    }
}

/// One chapter in the result list with the evidence for its excerpt
#[derive(Debug, Clone)]
pub struct ResultItem {
    pub chapter: usize,
    pub score: Option<f64>,
    pub evidence: Option<MatchEvidence>,
}

/// Filtered, ranked results for a request
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub items: Vec<ResultItem>,
    pub total: usize,
    pub all_filters_enabled: bool,
}

impl SearchOutcome {
    pub fn shown(&self) -> usize {
        self.items.len()
    }
}

/// Rendered fragments for the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedPage {
    pub stats: String,
    pub results: String,
    pub shown: usize,
    pub total: usize,
}

/// Owns the immutable catalog, its index and the excerpt settings
pub struct SearchSession {
    catalog: Catalog,
    index: Box<dyn SearchIndex>,
    extractor: ExcerptExtractor,
}

impl SearchSession {
    /// Build the configured index once over the catalog
    pub fn new(catalog: Catalog, config: &Config) -> Self {
        let index = build_index(&catalog, &config.search);
        let extractor = ExcerptExtractor::new(config.excerpt.clone());
        info!("✅ Search session ready with {} chapters", catalog.len());

        Self {
            catalog,
            index,
            extractor,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a request. An empty query lists every chapter in catalog order.
    pub fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let query = request.query.trim();
        let filter = &request.filter;

        let items: Vec<ResultItem> = if query.is_empty() {
            self.catalog
                .iter()
                .enumerate()
                .filter(|(_, chapter)| filter.matches(chapter))
                .map(|(chapter, _)| ResultItem {
                    chapter,
                    score: None,
                    evidence: None,
                })
                .collect()
        } else {
            let accept = |position: usize| {
                self.catalog
                    .get(position)
                    .map_or(false, |chapter| filter.matches(chapter))
            };
            self.index
                .search(query, &accept)
                .into_iter()
                .filter_map(|hit| {
                    let chapter = self.catalog.get(hit.chapter)?;
                    let evidence = transcript_evidence(chapter, &hit, query);
                    Some(ResultItem {
                        chapter: hit.chapter,
                        score: Some(hit.score),
                        evidence,
                    })
                })
                .collect()
        };

        debug!("Query '{}' -> {} of {} chapters", query, items.len(), self.catalog.len());
        SearchOutcome {
            query: query.to_string(),
            items,
            total: self.catalog.len(),
            all_filters_enabled: filter.is_unrestricted(&self.catalog),
        }
    }

    /// Excerpt for one result, computed fresh on every call
    pub fn excerpt_for(&self, item: &ResultItem) -> Option<String> {
        let chapter = self.catalog.get(item.chapter)?;
        let evidence = item.evidence.as_ref()?;
        self.extractor.extract(&chapter.transcript_segment, evidence)
    }

    /// Stats line and result blocks for an outcome
    pub fn render(&self, outcome: &SearchOutcome) -> RenderedPage {
        let results = render_results(outcome.items.iter().filter_map(|item| {
            let chapter = self.catalog.get(item.chapter)?;
            Some((chapter, self.excerpt_for(item)))
        }));

        RenderedPage {
            stats: render_stats(
                outcome.shown(),
                outcome.total,
                &outcome.query,
                outcome.all_filters_enabled,
            ),
            results,
            shown: outcome.shown(),
            total: outcome.total,
        }
    }

    /// Search and render in one step
    pub fn run(&self, request: &SearchRequest) -> RenderedPage {
        self.render(&self.search(request))
    }
}

/// Evidence locating the query inside the chapter transcript
fn transcript_evidence(chapter: &Chapter, hit: &SearchHit, query: &str) -> Option<MatchEvidence> {
    match &hit.matches {
        MatchData::Fields(fields) => {
            if let Some(direct) = fields.iter().find(|f| f.field == ChapterField::TranscriptSegment) {
                return Some(MatchEvidence::CharSpans(direct.spans.clone()));
            }
            let combined = fields.iter().find(|f| f.field == ChapterField::SearchText)?;
            let offset = chapter.transcript_offset();
            if combined.spans.iter().any(|s| s.start >= offset) {
                Some(MatchEvidence::ShiftedSpans {
                    spans: combined.spans.clone(),
                    offset,
                })
            } else {
                // The matcher settled on the title or date part of search_text
                Some(MatchEvidence::RawQuery(query.to_string()))
            }
        }
        MatchData::Terms(terms) => Some(MatchEvidence::Tokens(terms.clone())),
        MatchData::None => Some(MatchEvidence::RawQuery(query.to_string())),
    }
}
