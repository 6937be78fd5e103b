//! API request handlers

use anyhow::Result;
use serde_json::Value;

use super::models::{CoursesResponse, FacetCount, SearchParams};
use crate::session::{RenderedPage, SearchSession};

/// Handle health check requests
pub async fn health_check(session: &SearchSession) -> Result<Value> {
    Ok(serde_json::json!({
        "status": "healthy",
        "service": "lecture-search",
        "version": env!("CARGO_PKG_VERSION"),
        "chapters": session.catalog().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle course and semester listing requests
pub async fn list_courses(session: &SearchSession) -> Result<CoursesResponse> {
    let catalog = session.catalog();
    let to_facets = |counts: std::collections::BTreeMap<String, usize>| -> Vec<FacetCount> {
        counts
            .into_iter()
            .map(|(name, chapters)| FacetCount { name, chapters })
            .collect()
    };

    Ok(CoursesResponse {
        courses: to_facets(catalog.course_counts()),
        semesters: to_facets(catalog.semester_counts()),
        total: catalog.len(),
    })
}

/// Handle search requests
pub async fn search(session: &SearchSession, params: &SearchParams) -> Result<RenderedPage> {
    let request = params.to_request();
    tracing::debug!("API search '{}'", request.query);
    Ok(session.run(&request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, Chapter};
    use crate::config::Config;

    fn session() -> SearchSession {
        let catalog = Catalog::new(vec![
            Chapter::new("AVC185", "Lighting", "the key light").with_semester("Fall 2023"),
            Chapter::new("AVC200", "Export", "render and export").with_semester("Spring 2024"),
            Chapter::new("AVC200", "Codecs", "pick a codec"),
        ]);
        SearchSession::new(catalog, &Config::default())
    }

    #[tokio::test]
    async fn test_health_reports_chapter_count() {
        let health = health_check(&session()).await.unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["chapters"], 3);
    }

    #[tokio::test]
    async fn test_list_courses_counts() {
        let response = list_courses(&session()).await.unwrap();
        assert_eq!(
            response.courses,
            vec![
                FacetCount { name: "AVC185".to_string(), chapters: 1 },
                FacetCount { name: "AVC200".to_string(), chapters: 2 },
            ]
        );
        assert_eq!(response.semesters.len(), 2);
        assert_eq!(response.total, 3);
    }

    #[tokio::test]
    async fn test_search_without_query_shows_all() {
        let page = search(&session(), &SearchParams::default()).await.unwrap();
        assert_eq!(page.shown, 3);
        assert_eq!(page.stats, "Showing all <strong>3</strong> chapters");
    }

    #[tokio::test]
    async fn test_search_with_course_filter() {
        let params = SearchParams {
            courses: Some("AVC200".to_string()),
            ..Default::default()
        };
        let page = search(&session(), &params).await.unwrap();
        assert_eq!(page.shown, 2);
        assert_eq!(page.total, 3);
        assert!(page.stats.contains("(filtered by course)"));
    }
}
