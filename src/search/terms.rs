/// Token index with prefix and stem expansion
use super::{rank, MatchData, SearchHit, SearchIndex};
use crate::catalog::Catalog;
use crate::config::{SearchBackend, SearchConfig, WeightedKey};
use crate::excerpt::stem;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

const EXACT_WEIGHT: f64 = 1.0;
const PREFIX_WEIGHT: f64 = 0.5;
const STEM_WEIGHT: f64 = 0.3;

/// Lowercase alphanumeric runs
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Occurrences of a token in one field of one chapter
#[derive(Debug, Clone, Copy)]
struct Posting {
    chapter: usize,
    key: usize,
    count: u32,
}

/// Inverted index reporting matched tokens without positions
pub struct TermIndex {
    keys: Vec<WeightedKey>,
    postings: BTreeMap<String, Vec<Posting>>,
    /// stem -> tokens sharing it
    stems: HashMap<String, Vec<String>>,
    prefix_matching: bool,
    min_expansion_length: usize,
}

impl TermIndex {
    pub fn build(catalog: &Catalog, config: &SearchConfig) -> Self {
        let keys = config.term_keys.clone();
        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();

        for (chapter_idx, chapter) in catalog.iter().enumerate() {
            for (key_idx, key) in keys.iter().enumerate() {
                let mut counts: HashMap<String, u32> = HashMap::new();
                for token in tokenize(&chapter.field(key.field)) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                for (token, count) in counts {
                    postings.entry(token).or_default().push(Posting {
                        chapter: chapter_idx,
                        key: key_idx,
                        count,
                    });
                }
            }
        }

        let min_expansion_length = config.min_match_char_length;
        let mut stems: HashMap<String, Vec<String>> = HashMap::new();
        for token in postings.keys() {
            let key = stem_key(token, min_expansion_length);
            stems.entry(key).or_default().push(token.clone());
        }

        debug!("Term index holds {} distinct tokens", postings.len());
        Self {
            keys,
            postings,
            stems,
            prefix_matching: config.prefix_matching,
            min_expansion_length,
        }
    }

    /// Document tokens a query term expands to, with their match weight
    fn expand(&self, term: &str) -> Vec<(&str, f64)> {
        let mut expansions: BTreeMap<&str, f64> = BTreeMap::new();

        if let Some((token, _)) = self.postings.get_key_value(term) {
            expansions.insert(token.as_str(), EXACT_WEIGHT);
        }

        if term.chars().count() < self.min_expansion_length {
            return expansions.into_iter().collect();
        }

        if self.prefix_matching {
            for (token, _) in self
                .postings
                .range::<str, _>((std::ops::Bound::Excluded(term), std::ops::Bound::Unbounded))
                .take_while(|(token, _)| token.starts_with(term))
            {
                expansions.entry(token.as_str()).or_insert(PREFIX_WEIGHT);
            }
        }

        if let Some(tokens) = self.stems.get(&stem_key(term, self.min_expansion_length)) {
            for token in tokens {
                expansions.entry(token.as_str()).or_insert(STEM_WEIGHT);
            }
        }

        expansions.into_iter().collect()
    }
}

impl SearchIndex for TermIndex {
    fn search(&self, query: &str, filter: &dyn Fn(usize) -> bool) -> Vec<SearchHit> {
        let terms = tokenize(query);
        // chapter -> (score, matched tokens); BTreeMap keeps catalog order for ties
        let mut scored: BTreeMap<usize, (f64, Vec<String>)> = BTreeMap::new();

        for term in &terms {
            for (token, weight) in self.expand(term) {
                let Some(postings) = self.postings.get(token) else {
                    continue;
                };
                for posting in postings.iter().filter(|p| filter(p.chapter)) {
                    let entry = scored.entry(posting.chapter).or_insert_with(|| (0.0, Vec::new()));
                    entry.0 += weight * self.keys[posting.key].weight * f64::from(posting.count);
                    if !entry.1.iter().any(|t| t == token) {
                        entry.1.push(token.to_string());
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = scored
            .into_iter()
            .map(|(chapter, (score, tokens))| SearchHit {
                chapter,
                score,
                matches: MatchData::Terms(tokens),
            })
            .collect();

        rank(&mut hits);
        debug!("Term search '{}' matched {} chapters", query, hits.len());
        hits
    }

    fn backend(&self) -> SearchBackend {
        SearchBackend::Terms
    }
}

fn stem_key(token: &str, min_len: usize) -> String {
    stem(token, min_len).unwrap_or_else(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Chapter;

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Chapter::new("AVC200", "Rendering pipelines", "we talk about the GPU"),
            Chapter::new("AVC185", "Color grading", "render the timeline then export"),
            Chapter::new("AVC240", "Mixing", "levels, panning and renders of stems"),
        ])
    }

    fn terms_of(hit: &SearchHit) -> Vec<String> {
        match &hit.matches {
            MatchData::Terms(terms) => terms.clone(),
            other => panic!("expected terms, got {:?}", other),
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Hello, World! It's 2024"), vec!["hello", "world", "it", "s", "2024"]);
        assert!(tokenize("  ,, ").is_empty());
    }

    #[test]
    fn test_exact_prefix_and_stem_matches() {
        let index = TermIndex::build(&catalog(), &SearchConfig::default());
        let hits = index.search("render", &|_| true);
        assert_eq!(index.backend(), SearchBackend::Terms);

        let chapters: Vec<usize> = hits.iter().map(|h| h.chapter).collect();
        // title prefix (0.5 * 2) ties exact transcript (1.0), transcript prefix ranks last
        assert_eq!(chapters, vec![0, 1, 2]);
        assert_eq!(terms_of(&hits[0]), vec!["rendering"]);
        assert_eq!(terms_of(&hits[1]), vec!["render"]);
        assert_eq!(terms_of(&hits[2]), vec!["renders"]);
    }

    #[test]
    fn test_stem_only_matches() {
        let index = TermIndex::build(&catalog(), &SearchConfig::default());
        let hits = index.search("rendered", &|_| true);

        let chapters: Vec<usize> = hits.iter().map(|h| h.chapter).collect();
        assert_eq!(chapters, vec![0, 1, 2]);
        assert!((hits[0].score - 0.6).abs() < 1e-9);
        assert!((hits[1].score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_terms_combine_with_or() {
        let index = TermIndex::build(&catalog(), &SearchConfig::default());
        let hits = index.search("gpu export", &|_| true);
        let chapters: Vec<usize> = hits.iter().map(|h| h.chapter).collect();
        assert_eq!(chapters, vec![0, 1]);
    }

    #[test]
    fn test_short_terms_do_not_expand() {
        let index = TermIndex::build(&catalog(), &SearchConfig::default());
        assert!(index.search("re", &|_| true).is_empty());
    }

    #[test]
    fn test_filter_and_no_match() {
        let index = TermIndex::build(&catalog(), &SearchConfig::default());
        let hits = index.search("render", &|chapter| chapter == 2);
        assert_eq!(hits.len(), 1);
        assert!(index.search("orchestra", &|_| true).is_empty());
    }
}
