/// Lecture chapter catalog
///
/// This module holds the chapter data model and the loader that reads the
/// static JSON catalog from disk or over HTTP.

pub mod loader;

pub use loader::CatalogSource;

use crate::config::ChapterField;
use crate::error::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// One indexed lecture segment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    /// Course code, e.g. "AVC200"
    pub course: String,
    /// Semester label (later catalogs only)
    #[serde(default)]
    pub semester: Option<String>,
    /// Raw lecture date, usually ISO formatted
    #[serde(default)]
    pub date: Option<String>,
    /// Human readable lecture date
    #[serde(default)]
    pub formatted_date: Option<String>,
    /// Sortable date key
    #[serde(default)]
    pub sort_date: Option<String>,
    /// Chapter title
    #[serde(default)]
    pub title: String,
    /// Transcript text covered by this chapter
    #[serde(default)]
    pub transcript_segment: String,
    /// YouTube video id
    #[serde(default)]
    pub video_id: Option<String>,
    /// Offset into the video in seconds
    #[serde(default)]
    pub seconds: u64,
    /// Display timestamp, e.g. "12:34"
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Pre-built search text, derived when absent
    #[serde(default)]
    pub search_text: Option<String>,
}

impl Chapter {
    /// Create a chapter with the required fields only
    pub fn new(course: impl Into<String>, title: impl Into<String>, transcript: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            semester: None,
            date: None,
            formatted_date: None,
            sort_date: None,
            title: title.into(),
            transcript_segment: transcript.into(),
            video_id: None,
            seconds: 0,
            timestamp: None,
            thumbnail: None,
            search_text: None,
        }
    }

    pub fn with_semester(mut self, semester: impl Into<String>) -> Self {
        self.semester = Some(semester.into());
        self
    }

    pub fn with_formatted_date(mut self, date: impl Into<String>) -> Self {
        self.formatted_date = Some(date.into());
        self
    }

    pub fn with_video(mut self, video_id: impl Into<String>, seconds: u64) -> Self {
        self.video_id = Some(video_id.into());
        self.seconds = seconds;
        self
    }

    /// Date shown next to the course badge
    pub fn display_date(&self) -> Cow<'_, str> {
        if let Some(formatted) = self.formatted_date.as_deref().filter(|d| !d.is_empty()) {
            return Cow::Borrowed(formatted);
        }

        match self.date.as_deref() {
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Cow::Owned(date.format("%B %-d, %Y").to_string()),
                Err(_) => Cow::Borrowed(raw),
            },
            None => Cow::Borrowed(""),
        }
    }

    /// Timestamp shown on the watch link
    pub fn display_timestamp(&self) -> String {
        if let Some(timestamp) = self.timestamp.as_deref().filter(|t| !t.is_empty()) {
            return timestamp.to_string();
        }

        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;

        if hours > 0 {
            format!("{}:{:02}:{:02}", hours, minutes, seconds)
        } else {
            format!("{}:{:02}", minutes, seconds)
        }
    }

    /// Video id, treating an empty id as absent
    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref().filter(|id| !id.trim().is_empty())
    }

    /// YouTube link at this chapter's offset, if the chapter has a video
    pub fn video_url(&self) -> Option<String> {
        self.video_id().map(|id| {
            format!(
                "https://www.youtube.com/watch?v={}&t={}s",
                urlencoding::encode(id),
                self.seconds
            )
        })
    }

    fn search_prefix(&self) -> String {
        format!("{} {} {} ", self.course, self.display_date(), self.title)
    }

    /// Concatenated text used for weighted matching
    pub fn search_text(&self) -> Cow<'_, str> {
        match self.search_text.as_deref() {
            Some(text) => Cow::Borrowed(text),
            None => Cow::Owned(format!("{}{}", self.search_prefix(), self.transcript_segment)),
        }
    }

    /// Character offset of the transcript inside `search_text`
    pub fn transcript_offset(&self) -> usize {
        self.search_prefix().chars().count()
    }

    /// Text of a searchable field
    pub fn field(&self, field: ChapterField) -> Cow<'_, str> {
        match field {
            ChapterField::Title => Cow::Borrowed(&self.title),
            ChapterField::Course => Cow::Borrowed(&self.course),
            ChapterField::FormattedDate => self.display_date(),
            ChapterField::TranscriptSegment => Cow::Borrowed(&self.transcript_segment),
            ChapterField::SearchText => self.search_text(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogDocument {
    chapters: Vec<Chapter>,
}

/// Immutable, ordered chapter collection
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    chapters: Vec<Chapter>,
}

impl Catalog {
    pub fn new(chapters: Vec<Chapter>) -> Self {
        Self { chapters }
    }

    /// Parse a catalog document: a bare array or `{ "chapters": [...] }`
    pub fn from_json(json: &str) -> Result<Self> {
        let chapters = if json.trim_start().starts_with('{') {
            serde_json::from_str::<CatalogDocument>(json)?.chapters
        } else {
            serde_json::from_str::<Vec<Chapter>>(json)?
        };
        Ok(Self::new(chapters))
    }

    /// Load a catalog from a file path or http(s) URL
    pub async fn load(source: &str, timeout_seconds: u64) -> Result<Self> {
        CatalogSource::parse(source)?.load(timeout_seconds).await
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chapter> {
        self.chapters.iter()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Sorted unique course codes
    pub fn courses(&self) -> Vec<String> {
        self.course_counts().into_keys().collect()
    }

    /// Sorted unique semesters
    pub fn semesters(&self) -> Vec<String> {
        self.semester_counts().into_keys().collect()
    }

    /// Chapters per course
    pub fn course_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for chapter in &self.chapters {
            *counts.entry(chapter.course.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Chapters per semester, chapters without one are skipped
    pub fn semester_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for semester in self.chapters.iter().filter_map(|c| c.semester.as_ref()) {
            *counts.entry(semester.clone()).or_insert(0) += 1;
        }
        counts
    }
}
