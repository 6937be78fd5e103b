//! Excerpt extraction and highlighting
//!
//! Turns a transcript and whatever positional evidence the search index
//! produced into a bounded, HTML-escaped snippet with `<mark>` wrappers.
//! Offsets are character offsets into the raw text. The escaped output is
//! addressed through an offset map, so a wrapper can never open or close
//! inside an entity such as `&amp;`.

pub mod html;
pub mod locate;

pub use html::escape_html;
pub use locate::{stem, TermLocator};

use crate::config::ExcerptConfig;
use html::EscapedText;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Marker added where the window cuts the text
pub const ELLIPSIS: &str = "...";
pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// Half-open `[start, end)` character range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Positional information about where a query matched
#[derive(Debug, Clone, PartialEq)]
pub enum MatchEvidence {
    /// Spans relative to the text itself
    CharSpans(Vec<MatchSpan>),
    /// Spans relative to a longer field that embeds the text at `offset`
    ShiftedSpans { spans: Vec<MatchSpan>, offset: usize },
    /// Matched tokens without positions
    Tokens(Vec<String>),
    /// Only the query is known
    RawQuery(String),
}

/// A rendered excerpt and the window it was cut from
#[derive(Debug, Clone, PartialEq)]
pub struct Excerpt {
    /// Escaped, highlighted fragment including ellipsis markers
    pub html: String,
    /// Raw char range of the source text that is visible
    pub window: MatchSpan,
    /// Highlighted spans, relative to the window
    pub highlights: Vec<MatchSpan>,
}

impl Excerpt {
    pub fn has_leading_ellipsis(&self) -> bool {
        self.window.start > 0
    }
}

/// Builds excerpts according to an [`ExcerptConfig`]
#[derive(Debug, Clone)]
pub struct ExcerptExtractor {
    config: ExcerptConfig,
    locator: TermLocator,
}

impl ExcerptExtractor {
    pub fn new(config: ExcerptConfig) -> Self {
        let locator = TermLocator::new(config.min_term_length, config.stem_fallback);
        Self { config, locator }
    }

    /// Highlighted HTML fragment with the configured maximum length
    pub fn extract(&self, text: &str, evidence: &MatchEvidence) -> Option<String> {
        self.excerpt(text, evidence, self.config.max_length)
            .map(|excerpt| excerpt.html)
    }

    /// Build an excerpt whose window is at most `max_length` chars.
    ///
    /// Returns `None` for empty text or when no span can be located.
    pub fn excerpt(&self, text: &str, evidence: &MatchEvidence, max_length: usize) -> Option<Excerpt> {
        if text.trim().is_empty() || max_length == 0 {
            return None;
        }

        let chars: Vec<char> = text.chars().collect();
        let spans = self.resolve_spans(text, chars.len(), evidence);

        let Some(anchor) = spans.iter().min_by_key(|s| s.start) else {
            debug!("No excerpt: nothing located for {:?}", evidence_kind(evidence));
            return None;
        };

        // Give up lookback before cutting into the anchor match
        let before = self
            .config
            .context_before
            .min(max_length / 2)
            .min(max_length.saturating_sub(anchor.len()));
        let start = anchor.start.saturating_sub(before);
        let end = (start + max_length).min(chars.len());
        let highlights = window_spans(&spans, start, end - start);

        let escaped = EscapedText::new(&chars[start..end]);
        let lead = if start > 0 { ELLIPSIS.len() } else { 0 };

        let mut html = String::with_capacity(
            escaped.html.len() + 2 * ELLIPSIS.len() + highlights.len() * (MARK_OPEN.len() + MARK_CLOSE.len()),
        );
        if start > 0 {
            html.push_str(ELLIPSIS);
        }
        html.push_str(&escaped.html);
        if end < chars.len() {
            html.push_str(ELLIPSIS);
        }

        // Highest offsets first, so pending lower offsets stay valid
        for span in highlights.iter().rev() {
            html.insert_str(lead + escaped.offset(span.end), MARK_CLOSE);
            html.insert_str(lead + escaped.offset(span.start), MARK_OPEN);
        }

        Some(Excerpt {
            html,
            window: MatchSpan::new(start, end),
            highlights,
        })
    }

    /// Turn evidence into in-bounds char spans over `text`
    pub fn resolve_spans(&self, text: &str, text_len: usize, evidence: &MatchEvidence) -> Vec<MatchSpan> {
        let spans = match evidence {
            MatchEvidence::CharSpans(spans) => spans.clone(),
            MatchEvidence::ShiftedSpans { spans, offset } => spans
                .iter()
                .filter_map(|s| {
                    Some(MatchSpan::new(
                        s.start.checked_sub(*offset)?,
                        s.end.checked_sub(*offset)?,
                    ))
                })
                .collect(),
            MatchEvidence::Tokens(tokens) => self.locator.locate_terms(text, tokens),
            MatchEvidence::RawQuery(query) => self.locator.locate_query(text, query),
        };

        spans
            .into_iter()
            .filter(|s| !s.is_empty() && s.end <= text_len)
            .collect()
    }
}

impl Default for ExcerptExtractor {
    fn default() -> Self {
        Self::new(ExcerptConfig::default())
    }
}

/// Spans starting inside `[start, start + len)`, clipped to the window end,
/// shifted to window-relative, sorted and with overlaps removed
fn window_spans(spans: &[MatchSpan], start: usize, len: usize) -> Vec<MatchSpan> {
    let end = start + len;
    let mut inside: Vec<MatchSpan> = spans
        .iter()
        .filter(|s| s.start >= start && s.start < end)
        .map(|s| MatchSpan::new(s.start - start, s.end.min(end) - start))
        .collect();
    inside.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut accepted: Vec<MatchSpan> = Vec::with_capacity(inside.len());
    for span in inside {
        match accepted.last() {
            Some(last) if span.start < last.end => {
                trace!("Dropping overlapping span {:?}", span);
            }
            _ => accepted.push(span),
        }
    }

    let dropped = spans.len() - accepted.len();
    if dropped > 0 {
        trace!("Dropped {} spans outside the window or overlapping", dropped);
    }
    accepted
}

fn evidence_kind(evidence: &MatchEvidence) -> &'static str {
    match evidence {
        MatchEvidence::CharSpans(_) => "char spans",
        MatchEvidence::ShiftedSpans { .. } => "shifted spans",
        MatchEvidence::Tokens(_) => "tokens",
        MatchEvidence::RawQuery(_) => "raw query",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ExcerptExtractor {
        ExcerptExtractor::default()
    }

    fn query(q: &str) -> MatchEvidence {
        MatchEvidence::RawQuery(q.to_string())
    }

    fn spans(pairs: &[(usize, usize)]) -> Vec<MatchSpan> {
        pairs.iter().map(|&(s, e)| MatchSpan::new(s, e)).collect()
    }

    #[test]
    fn test_short_window_gets_both_ellipses() {
        let excerpt = extractor()
            .excerpt("The quick brown fox jumps", &query("brown"), 10)
            .unwrap();

        assert_eq!(excerpt.html, "...uick <mark>brown</mark>...");
        assert_eq!(excerpt.window, MatchSpan::new(5, 15));
        assert!(excerpt.window.len() <= 10);
        assert!(excerpt.has_leading_ellipsis());
    }

    #[test]
    fn test_no_ellipsis_at_text_boundaries() {
        let html = extractor().extract("brown fox", &query("brown")).unwrap();
        assert_eq!(html, "<mark>brown</mark> fox");
    }

    #[test]
    fn test_window_never_exceeds_max_length() {
        let text = "lorem ipsum dolor sit amet ".repeat(40) + "needle" + &" consectetur".repeat(40);
        for max_length in [1, 7, 50, 200, 5000] {
            if let Some(excerpt) = extractor().excerpt(&text, &query("needle"), max_length) {
                assert!(excerpt.window.len() <= max_length);
                let chars = text.chars().count();
                assert_eq!(excerpt.html.starts_with(ELLIPSIS), excerpt.window.start > 0);
                assert_eq!(excerpt.html.ends_with(ELLIPSIS), excerpt.window.end < chars);
            }
        }
    }

    #[test]
    fn test_anchor_uses_context_before() {
        let text = format!("{}needle{}", "a".repeat(100), "b".repeat(300));
        let excerpt = extractor().excerpt(&text, &query("needle"), 200).unwrap();
        assert_eq!(excerpt.window, MatchSpan::new(40, 240));
        assert_eq!(excerpt.highlights, vec![MatchSpan::new(60, 66)]);
    }

    #[test]
    fn test_highlights_do_not_split_entities() {
        let text = "if a < b && c > d then";
        let evidence = MatchEvidence::CharSpans(spans(&[(9, 11)]));
        let html = extractor().extract(text, &evidence).unwrap();
        assert_eq!(html, "if a &lt; b <mark>&amp;&amp;</mark> c &gt; d then");
    }

    #[test]
    fn test_transcript_markup_is_escaped() {
        let text = "<script>alert('x')</script> lighting setup";
        let html = extractor().extract(text, &query("lighting")).unwrap();
        assert!(html.starts_with("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; "));
        assert!(html.ends_with("<mark>lighting</mark> setup"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_out_of_bounds_spans_are_dropped() {
        let text = "short transcript";
        let only_bad = MatchEvidence::CharSpans(spans(&[(50, 60)]));
        assert!(extractor().extract(text, &only_bad).is_none());

        let mixed = MatchEvidence::CharSpans(spans(&[(0, 5), (10, 99), (7, 7)]));
        assert_eq!(
            extractor().extract(text, &mixed).unwrap(),
            "<mark>short</mark> transcript"
        );
    }

    #[test]
    fn test_overlapping_spans_are_dropped() {
        let text = "the quick brown fox";
        let evidence = MatchEvidence::CharSpans(spans(&[(4, 9), (6, 12), (16, 19)]));
        assert_eq!(
            extractor().extract(text, &evidence).unwrap(),
            "the <mark>quick</mark> brown <mark>fox</mark>"
        );
    }

    #[test]
    fn test_spans_outside_window_are_not_highlighted() {
        let text = format!("needle {} needle", "x".repeat(300));
        let excerpt = extractor().excerpt(&text, &query("needle"), 50).unwrap();
        assert_eq!(excerpt.window, MatchSpan::new(0, 50));
        assert_eq!(excerpt.highlights, vec![MatchSpan::new(0, 6)]);
        assert_eq!(excerpt.html.matches(MARK_OPEN).count(), 1);
    }

    #[test]
    fn test_match_longer_than_window_is_clipped_and_highlighted() {
        let excerpt = extractor()
            .excerpt("The quick brownish fox", &query("brownish"), 4)
            .unwrap();
        assert_eq!(excerpt.window, MatchSpan::new(10, 14));
        assert_eq!(excerpt.highlights, vec![MatchSpan::new(0, 4)]);
        assert_eq!(excerpt.html, "...<mark>brow</mark>...");
    }

    #[test]
    fn test_lookback_shrinks_to_fit_whole_match() {
        let excerpt = extractor()
            .excerpt("The quick brownish fox", &query("brownish"), 10)
            .unwrap();
        assert_eq!(excerpt.window, MatchSpan::new(8, 18));
        assert_eq!(excerpt.html, "...k <mark>brownish</mark>...");
    }

    #[test]
    fn test_earliest_span_is_anchor() {
        let text = format!("{}alpha{}beta", "x".repeat(20), "y".repeat(300));
        let evidence = MatchEvidence::CharSpans(spans(&[(325, 329), (20, 25)]));
        let excerpt = extractor().excerpt(&text, &evidence, 200).unwrap();
        assert_eq!(excerpt.window.start, 0);
        assert!(excerpt.html.contains("<mark>alpha</mark>"));
        assert!(!excerpt.html.contains("<mark>beta</mark>"));
    }

    #[test]
    fn test_shifted_spans() {
        let text = "exposure triangle basics";
        let evidence = MatchEvidence::ShiftedSpans {
            spans: spans(&[(2, 6), (10, 18)]),
            offset: 10,
        };
        assert_eq!(
            extractor().extract(text, &evidence).unwrap(),
            "<mark>exposure</mark> triangle basics"
        );
    }

    #[test]
    fn test_stem_fallback_highlights_stem() {
        let html = extractor()
            .extract("today we render the scene", &query("rendering"))
            .unwrap();
        assert_eq!(html, "today we <mark>render</mark> the scene");
    }

    #[test]
    fn test_tokens_evidence() {
        let evidence = MatchEvidence::Tokens(vec!["aperture".to_string(), "iso".to_string()]);
        let html = extractor()
            .extract("Set the Aperture first, then ISO.", &evidence)
            .unwrap();
        assert_eq!(html, "Set the <mark>Aperture</mark> first, then <mark>ISO</mark>.");
    }

    #[test]
    fn test_empty_inputs_yield_none() {
        let ex = extractor();
        assert!(ex.extract("", &query("brown")).is_none());
        assert!(ex.extract("   ", &query("brown")).is_none());
        assert!(ex.extract("brown fox", &query("")).is_none());
        assert!(ex.extract("brown fox", &query("   ")).is_none());
        assert!(ex.extract("brown fox", &query("a b")).is_none());
        assert!(ex.extract("brown fox", &query("zebra")).is_none());
    }

    #[test]
    fn test_multibyte_text() {
        let html = extractor()
            .extract("café crème brûlée", &query("crème"))
            .unwrap();
        assert_eq!(html, "café <mark>crème</mark> brûlée");
    }

    #[test]
    fn test_every_occurrence_in_window_is_highlighted() {
        let html = extractor().extract("fox jumps over fox", &query("fox")).unwrap();
        assert_eq!(html, "<mark>fox</mark> jumps over <mark>fox</mark>");
    }
}
