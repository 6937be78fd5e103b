//! API data models

use serde::{Deserialize, Serialize};

use crate::session::{ChapterFilter, SearchRequest};

/// Query string of `GET /api/search`
///
/// `courses` and `semesters` are comma separated. An absent list enables
/// everything; a present but empty list enables nothing.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub courses: Option<String>,
    #[serde(default)]
    pub semesters: Option<String>,
}

impl SearchParams {
    pub fn to_request(&self) -> SearchRequest {
        let mut filter = ChapterFilter::all();
        if let Some(courses) = &self.courses {
            filter = filter.with_courses(split_list(courses));
        }
        if let Some(semesters) = &self.semesters {
            filter = filter.with_semesters(split_list(semesters));
        }
        SearchRequest::new(self.q.clone().unwrap_or_default(), filter)
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Chapter count for one course or semester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub name: String,
    pub chapters: usize,
}

/// Response of `GET /api/courses`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub courses: Vec<FacetCount>,
    pub semesters: Vec<FacetCount>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_lists_enable_everything() {
        let params = SearchParams {
            q: Some("lighting".to_string()),
            ..Default::default()
        };
        let request = params.to_request();
        assert_eq!(request.query, "lighting");
        assert_eq!(request.filter, ChapterFilter::all());
    }

    #[test]
    fn test_lists_are_split_and_trimmed() {
        let params = SearchParams {
            q: None,
            courses: Some("AVC185, AVC200,,".to_string()),
            semesters: Some(String::new()),
        };
        let request = params.to_request();
        assert_eq!(request.query, "");
        assert_eq!(
            request.filter,
            ChapterFilter::all()
                .with_courses(["AVC185", "AVC200"])
                .with_semesters(Vec::<String>::new())
        );
    }
}
