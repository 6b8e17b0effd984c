//! Extension interface
//!
//! This module defines the operations every catalogue extension exposes to
//! its host, together with their option records:
//! - Searching manga by title
//! - The explorer landing page (latest and most followed)
//! - Manga details
//! - One page of a manga's chapter feed
//! - Page image URLs for a chapter
//! - The rate-limit probe

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::api::models::{Chapter, Manga};
use crate::api::query::NestedValue;
use crate::core::error::Result;

/// Catalogue extension trait
#[async_trait]
pub trait Extension: Send + Sync {
    /// Identity advertised to the host
    fn metadata(&self) -> &ExtensionMetadata;

    /// Search manga by title, each result enriched with its cover filename
    ///
    /// # Errors
    /// Returns an error if the search request itself fails. Cover lookups
    /// never fail the search.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Manga>>;

    /// Latest and most followed manga, fetched concurrently
    ///
    /// Either list degrades to empty when its request fails.
    async fn explorer(&self, options: &ExplorerOptions) -> ExplorerSections;

    /// Manga details, or `None` when the catalogue has no such entry
    async fn informations(&self, manga_id: &str) -> Result<Option<Manga>>;

    /// One page of a manga's chapter feed, ascending by chapter number
    async fn chapters(&self, manga_id: &str, options: &ChapterOptions) -> Result<Vec<Chapter>>;

    /// Absolute page image URLs of a chapter, in reading order
    async fn reader(&self, chapter_id: &str) -> Result<Vec<String>>;

    /// Whether the local rate-limit cooldown is active
    fn is_api_rate_limited(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMetadata {
    pub id: String,
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Sort specification sent as `order[field]=direction` pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder(Vec<(String, SortDirection)>);

impl SortOrder {
    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self(vec![(field.into(), direction)])
    }

    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.0.push((field.into(), direction));
        self
    }

    pub fn relevance() -> Self {
        Self::by("relevance", SortDirection::Desc)
    }

    pub fn latest_uploaded_chapter() -> Self {
        Self::by("latestUploadedChapter", SortDirection::Desc)
    }

    pub fn followed_count() -> Self {
        Self::by("followedCount", SortDirection::Desc)
    }

    pub fn to_nested(&self) -> Vec<(String, NestedValue)> {
        self.0
            .iter()
            .map(|(field, direction)| (field.clone(), NestedValue::Scalar(direction.to_string().into())))
            .collect()
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::relevance()
    }
}

impl FromStr for SortOrder {
    type Err = String;

    /// Parses `field:dir[,field:dir...]`; a bare field sorts descending
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut entries = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (field, direction) = match part.split_once(':') {
                Some((field, "asc")) => (field, SortDirection::Asc),
                Some((field, "desc")) => (field, SortDirection::Desc),
                Some((_, other)) => return Err(format!("unknown sort direction: {}", other)),
                None => (part, SortDirection::Desc),
            };
            if field.is_empty() {
                return Err(format!("missing sort field in '{}'", part));
            }
            entries.push((field.to_string(), direction));
        }

        if entries.is_empty() {
            return Err("sort order cannot be empty".to_string());
        }
        Ok(Self(entries))
    }
}

/// Maturity classification used by the content rating filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRating {
    Safe,
    Suggestive,
    Erotica,
    Pornographic,
}

impl ContentRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentRating::Safe => "safe",
            ContentRating::Suggestive => "suggestive",
            ContentRating::Erotica => "erotica",
            ContentRating::Pornographic => "pornographic",
        }
    }

    /// Ratings to request; empty means the server applies no restriction
    pub fn filter(mature_content: bool) -> &'static [ContentRating] {
        const UNRESTRICTED: &[ContentRating] = &[];
        const NON_MATURE: &[ContentRating] = &[ContentRating::Safe, ContentRating::Suggestive];

        if mature_content {
            UNRESTRICTED
        } else {
            NON_MATURE
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: u32,
    pub mature_content: bool,
    pub order: SortOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            mature_content: true,
            order: SortOrder::relevance(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerOptions {
    pub limit: u32,
    pub mature_content: bool,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            mature_content: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterOptions {
    pub language: String,
    /// 1-indexed
    pub page: u32,
    pub limit: u32,
}

impl ChapterOptions {
    /// Feed offset of the requested page; page 0 is treated as page 1
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit)
    }
}

impl Default for ChapterOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            page: 1,
            limit: 100,
        }
    }
}

/// Explorer landing page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorerSections {
    #[serde(rename = "Latest Manga")]
    pub latest: Vec<Manga>,
    #[serde(rename = "Most Followed Manga")]
    pub most_followed: Vec<Manga>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!(
            "followedCount:desc".parse::<SortOrder>().unwrap(),
            SortOrder::followed_count()
        );
        assert_eq!(
            "year:asc, title".parse::<SortOrder>().unwrap(),
            SortOrder::by("year", SortDirection::Asc).then("title", SortDirection::Desc)
        );
        assert!("year:sideways".parse::<SortOrder>().is_err());
        assert!(":asc".parse::<SortOrder>().is_err());
        assert!("".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_nested_values() {
        let nested = SortOrder::relevance().to_nested();
        assert_eq!(nested, vec![("relevance".to_string(), NestedValue::Scalar("desc".into()))]);
    }

    #[test]
    fn test_content_rating_filter() {
        assert!(ContentRating::filter(true).is_empty());
        assert_eq!(
            ContentRating::filter(false),
            &[ContentRating::Safe, ContentRating::Suggestive]
        );
    }

    #[test]
    fn test_chapter_offset() {
        let mut options = ChapterOptions::default();
        assert_eq!(options.offset(), 0);

        options.page = 3;
        options.limit = 50;
        assert_eq!(options.offset(), 100);

        options.page = 0;
        assert_eq!(options.offset(), 0);
    }

    #[test]
    fn test_explorer_sections_serialization() {
        let json = serde_json::to_value(ExplorerSections::default()).unwrap();
        assert_eq!(json, serde_json::json!({"Latest Manga": [], "Most Followed Manga": []}));
    }
}
