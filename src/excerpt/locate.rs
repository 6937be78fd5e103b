//! Locating query terms inside a transcript when no positions are known
use super::MatchSpan;
use regex::RegexBuilder;
use tracing::{debug, trace};

/// Suffixes tried by the stem fallback, longest first
const STEM_SUFFIXES: [&str; 5] = ["ies", "ing", "es", "ed", "s"];

/// Strip the longest known suffix, keeping at least `min_len` chars
pub fn stem(word: &str, min_len: usize) -> Option<String> {
    let word = word.to_lowercase();
    STEM_SUFFIXES.iter().find_map(|suffix| {
        let base = word.strip_suffix(suffix)?;
        (base.chars().count() >= min_len).then(|| base.to_string())
    })
}

/// Whitespace-delimited, lowercased, de-duplicated terms of at least `min_len` chars
pub fn query_terms(query: &str, min_len: usize) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.split_whitespace() {
        let term = term.to_lowercase();
        if term.chars().count() >= min_len && !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Case-insensitive substring locator with an optional stem fallback
#[derive(Debug, Clone)]
pub struct TermLocator {
    min_term_length: usize,
    stem_fallback: bool,
}

impl TermLocator {
    pub fn new(min_term_length: usize, stem_fallback: bool) -> Self {
        Self {
            min_term_length,
            stem_fallback,
        }
    }

    /// Whole phrase first, then individual terms, then their stems
    pub fn locate_query(&self, text: &str, query: &str) -> Vec<MatchSpan> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        if query.chars().count() >= self.min_term_length {
            let spans = find_all(text, &[query.to_string()]);
            if !spans.is_empty() {
                trace!("Phrase match for '{}'", query);
                return spans;
            }
        }

        let terms = query_terms(query, self.min_term_length);
        self.locate_terms(text, &terms)
    }

    /// Locate each term, retrying with stems when nothing matched
    pub fn locate_terms(&self, text: &str, terms: &[String]) -> Vec<MatchSpan> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| t.chars().count() >= self.min_term_length)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let spans = find_all(text, &terms);
        if !spans.is_empty() || !self.stem_fallback {
            return spans;
        }

        let stems: Vec<String> = terms
            .iter()
            .filter_map(|t| stem(t, self.min_term_length))
            .collect();
        if stems.is_empty() {
            return Vec::new();
        }

        debug!("Falling back to stems {:?}", stems);
        find_all(text, &stems)
    }
}

/// Every case-insensitive occurrence of any needle, as char spans
fn find_all(text: &str, needles: &[String]) -> Vec<MatchSpan> {
    let mut needles: Vec<&str> = needles.iter().map(String::as_str).filter(|n| !n.is_empty()).collect();
    if text.is_empty() || needles.is_empty() {
        return Vec::new();
    }

    // Longer alternatives first so "rendering" wins over "render" at the same spot
    needles.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = needles
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");

    let re = match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re,
        Err(e) => {
            debug!("Could not build term pattern: {}", e);
            return Vec::new();
        }
    };

    // Matches arrive in order, so char positions can be counted incrementally
    let mut spans = Vec::new();
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for m in re.find_iter(text) {
        char_pos += text[byte_pos..m.start()].chars().count();
        let len = m.as_str().chars().count();
        spans.push(MatchSpan::new(char_pos, char_pos + len));
        char_pos += len;
        byte_pos = m.end();
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(stem("rendering", 3).as_deref(), Some("render"));
        assert_eq!(stem("studies", 3).as_deref(), Some("stud"));
        assert_eq!(stem("classes", 3).as_deref(), Some("class"));
        assert_eq!(stem("lighted", 3).as_deref(), Some("light"));
        assert_eq!(stem("cameras", 3).as_deref(), Some("camera"));
        assert_eq!(stem("bus", 3), None);
        assert_eq!(stem("audio", 3), None);
    }

    #[test]
    fn test_query_terms_filters_short_and_duplicates() {
        assert_eq!(query_terms("The cut at the CUT", 3), vec!["the", "cut"]);
        assert!(query_terms("a an", 3).is_empty());
    }

    #[test]
    fn test_find_all_counts_chars_not_bytes() {
        let spans = find_all("café crème, Crème", &["crème".to_string()]);
        assert_eq!(spans, vec![MatchSpan::new(5, 10), MatchSpan::new(12, 17)]);
    }

    #[test]
    fn test_phrase_before_terms() {
        let locator = TermLocator::new(3, true);
        let spans = locator.locate_query("white balance and balance white", "white balance");
        assert_eq!(spans, vec![MatchSpan::new(0, 13)]);
    }

    #[test]
    fn test_terms_when_phrase_missing() {
        let locator = TermLocator::new(3, true);
        let spans = locator.locate_query("the shutter and the aperture", "aperture shutter");
        assert_eq!(spans, vec![MatchSpan::new(4, 11), MatchSpan::new(20, 28)]);
    }

    #[test]
    fn test_stem_fallback() {
        let locator = TermLocator::new(3, true);
        let spans = locator.locate_query("we render frames", "rendering");
        assert_eq!(spans, vec![MatchSpan::new(3, 9)]);

        let strict = TermLocator::new(3, false);
        assert!(strict.locate_query("we render frames", "rendering").is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let locator = TermLocator::new(3, true);
        let spans = locator.locate_query("use f(x) here", "f(x)");
        assert_eq!(spans, vec![MatchSpan::new(4, 8)]);
    }
}
