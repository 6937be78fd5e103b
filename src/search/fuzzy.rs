/// Weighted fuzzy matching over chapter fields
use super::{rank, FieldMatch, MatchData, SearchHit, SearchIndex};
use crate::catalog::Catalog;
use crate::config::{SearchBackend, SearchConfig, WeightedKey};
use crate::excerpt::MatchSpan;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::debug;

/// Fuzzy index reporting per-field character spans
pub struct FuzzyIndex {
    matcher: SkimMatcherV2,
    keys: Vec<WeightedKey>,
    /// Field texts per chapter, in `keys` order
    entries: Vec<Vec<String>>,
    threshold: f64,
    min_match_char_length: usize,
}

impl FuzzyIndex {
    pub fn build(catalog: &Catalog, config: &SearchConfig) -> Self {
        let keys = config.fuzzy_keys.clone();
        let entries = catalog
            .iter()
            .map(|chapter| keys.iter().map(|k| chapter.field(k.field).into_owned()).collect())
            .collect();

        Self {
            matcher: SkimMatcherV2::default().ignore_case(),
            keys,
            entries,
            threshold: config.threshold,
            min_match_char_length: config.min_match_char_length,
        }
    }

    /// Coverage of the query by contiguous runs, plus the runs themselves.
    /// `None` when the field misses the threshold.
    fn match_field(&self, text: &str, query: &str, query_len: usize) -> Option<(f64, Vec<MatchSpan>)> {
        if text.is_empty() {
            return None;
        }

        let (_, indices) = self.matcher.fuzzy_indices(text, query)?;
        let spans: Vec<MatchSpan> = indices_to_spans(&indices)
            .into_iter()
            .filter(|s| s.len() >= self.min_match_char_length)
            .collect();

        let covered: usize = spans.iter().map(MatchSpan::len).sum();
        let coverage = covered as f64 / query_len as f64;
        (coverage >= 1.0 - self.threshold && !spans.is_empty()).then_some((coverage, spans))
    }
}

impl SearchIndex for FuzzyIndex {
    fn search(&self, query: &str, filter: &dyn Fn(usize) -> bool) -> Vec<SearchHit> {
        let query_len = query.chars().count();
        if query_len == 0 {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(chapter, _)| filter(*chapter))
            .filter_map(|(chapter, fields)| {
                let mut score = 0.0;
                let mut matches = Vec::new();

                for (key, text) in self.keys.iter().zip(fields) {
                    if let Some((coverage, spans)) = self.match_field(text, query, query_len) {
                        score += key.weight * coverage;
                        matches.push(FieldMatch { field: key.field, spans });
                    }
                }

                (!matches.is_empty()).then(|| SearchHit {
                    chapter,
                    score,
                    matches: MatchData::Fields(matches),
                })
            })
            .collect();

        rank(&mut hits);
        debug!("Fuzzy search '{}' matched {} chapters", query, hits.len());
        hits
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::Fuzzy
    }
}

/// Merge ascending char indices into half-open runs
fn indices_to_spans(indices: &[usize]) -> Vec<MatchSpan> {
    let mut spans: Vec<MatchSpan> = Vec::new();
    for &index in indices {
        match spans.last_mut() {
            Some(last) if last.end == index => last.end += 1,
            _ => spans.push(MatchSpan::new(index, index + 1)),
        }
    }
    spans
}
