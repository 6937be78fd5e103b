//! HTML fragments for results, statistics and status messages
//!
//! Everything interpolated here is escaped. The only markup passed through
//! untouched is an excerpt, which the extractor has already escaped and
//! highlighted.

use crate::catalog::Chapter;
use crate::excerpt::escape_html;

/// One result block
pub fn render_result(chapter: &Chapter, excerpt: Option<&str>) -> String {
    let thumbnail_html = chapter
        .thumbnail
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|src| {
            format!(
                r#"<img src="{}" alt="Chapter thumbnail" class="result-thumbnail" loading="lazy">"#,
                escape_html(src)
            )
        })
        .unwrap_or_default();

    let excerpt_html = excerpt
        .map(|e| format!(r#"<div class="result-excerpt">{}</div>"#, e))
        .unwrap_or_default();

    let link_html = match chapter.video_url() {
        Some(url) => format!(
            r#"<a href="{}" class="result-link" target="_blank" rel="noopener"><span class="timestamp">{}</span><span>Watch in YouTube</span></a>"#,
            escape_html(&url),
            escape_html(&chapter.display_timestamp())
        ),
        None => r#"<span class="link-unavailable">Video link not available</span>"#.to_string(),
    };

    format!(
        concat!(
            r#"<div class="result-item">{thumbnail}<div class="result-content">"#,
            r#"<div class="result-header"><span class="course-badge {badge}">{course}</span>"#,
            r#"<span class="result-date">{date}</span></div>"#,
            r#"<div class="result-title">{title}</div>{excerpt}{link}</div></div>"#,
        ),
        thumbnail = thumbnail_html,
        badge = escape_html(&chapter.course.to_lowercase()),
        course = escape_html(&chapter.course),
        date = escape_html(&chapter.display_date()),
        title = escape_html(&chapter.title),
        excerpt = excerpt_html,
        link = link_html,
    )
}

/// All result blocks, or the empty-state block when there are none
pub fn render_results<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = (&'a Chapter, Option<String>)>,
{
    let html: String = items
        .into_iter()
        .map(|(chapter, excerpt)| render_result(chapter, excerpt.as_deref()))
        .collect();

    if html.is_empty() {
        render_empty_state()
    } else {
        html
    }
}

pub fn render_empty_state() -> String {
    concat!(
        r#"<div class="no-results"><h3>No Results Found</h3>"#,
        r#"<p>Try a different search term or adjust your filters.</p></div>"#,
    )
    .to_string()
}

/// Shown when the catalog could not be loaded
pub fn render_load_error(message: &str) -> String {
    format!(
        concat!(
            r#"<div class="no-results load-error"><h3>Error Loading Data</h3>"#,
            r#"<p>Could not load lecture chapters. Please try again later.</p>"#,
            r#"<p class="error-detail">{}</p></div>"#,
        ),
        escape_html(message)
    )
}

/// Summary line above the results
pub fn render_stats(shown: usize, total: usize, query: &str, all_filters_enabled: bool) -> String {
    let query = query.trim();
    if query.is_empty() && all_filters_enabled {
        format!("Showing all <strong>{}</strong> chapters", total)
    } else if query.is_empty() {
        format!(
            "Showing <strong>{}</strong> of <strong>{}</strong> chapters (filtered by course)",
            shown, total
        )
    } else {
        format!(
            r#"Found <strong>{}</strong> results for "{}""#,
            shown,
            escape_html(query)
        )
    }
}
