//! Typed records for the catalogue's JSON responses
//!
//! Only the fields this crate reads are typed. Everything else on an entity
//! is kept in a flattened `extra` map so that resources pass through to the
//! caller without losing data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Host serving cover images
pub const COVER_HOST: &str = "https://uploads.mangadex.org";

/// Relationship type naming a manga's cover image
pub const COVER_ART: &str = "cover_art";

/// Localized string map, e.g. `{"en": "Berserk"}`
pub type LocalizedString = BTreeMap<String, String>;

/// The catalogue encodes an empty localized string as `[]` instead of `{}`.
/// Anything that is not an object reads as empty, and non-string entries are
/// skipped.
fn localized_from_value(value: Value) -> LocalizedString {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(lang, text)| match text {
                Value::String(text) => Some((lang, text)),
                _ => None,
            })
            .collect(),
        _ => LocalizedString::new(),
    }
}

fn deserialize_localized<'de, D>(deserializer: D) -> Result<LocalizedString, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(localized_from_value)
}

fn deserialize_localized_list<'de, D>(deserializer: D) -> Result<Vec<LocalizedString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(localized_from_value).collect(),
        _ => Vec::new(),
    })
}

/// `{"result": "ok", "data": [...]}` list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// `{"result": "ok", "data": {...}}` single-entity envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Typed cross-reference between resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manga {
    pub id: String,
    #[serde(rename = "type", default = "manga_kind")]
    pub kind: String,
    #[serde(default)]
    pub attributes: MangaAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// Filled in by cover enrichment
    #[serde(rename = "coverFileName", default, skip_serializing_if = "Option::is_none")]
    pub cover_file_name: Option<String>,
}

fn manga_kind() -> String {
    "manga".to_string()
}

impl Manga {
    /// First relationship of the given type, in API order
    pub fn relationship(&self, kind: &str) -> Option<&Relationship> {
        self.relationships.iter().find(|rel| rel.kind == kind)
    }

    pub fn cover_relationship(&self) -> Option<&Relationship> {
        self.relationship(COVER_ART)
    }

    /// Copy of this manga carrying the given cover filename
    pub fn with_cover_file_name(&self, file_name: Option<String>) -> Self {
        Self {
            cover_file_name: file_name,
            ..self.clone()
        }
    }

    /// Public cover image URL, once the cover filename is known
    pub fn cover_url(&self) -> Option<String> {
        self.cover_file_name
            .as_ref()
            .map(|file_name| format!("{}/covers/{}/{}", COVER_HOST, self.id, file_name))
    }

    /// English title, falling back to the first available translation
    pub fn display_title(&self) -> Option<&str> {
        let titles = &self.attributes.title;
        titles
            .get("en")
            .or_else(|| titles.values().next())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MangaAttributes {
    #[serde(default, deserialize_with = "deserialize_localized")]
    pub title: LocalizedString,
    #[serde(
        default,
        deserialize_with = "deserialize_localized_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alt_titles: Vec<LocalizedString>,
    #[serde(default, deserialize_with = "deserialize_localized")]
    pub description: LocalizedString,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_chapter: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cover {
    pub id: String,
    pub attributes: CoverAttributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverAttributes {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    #[serde(rename = "type", default = "chapter_kind")]
    pub kind: String,
    #[serde(default)]
    pub attributes: ChapterAttributes,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

fn chapter_kind() -> String {
    "chapter".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub translated_language: Option<String>,
    #[serde(default)]
    pub publish_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /at-home/server/{id}` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeServer {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub chapter: Option<AtHomeChapter>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtHomeChapter {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub data: Vec<String>,
    #[serde(default)]
    pub data_saver: Vec<String>,
}

impl AtHomeServer {
    /// Absolute page URLs, `{baseUrl}/data/{hash}/{filename}` in page order
    ///
    /// Empty when the server did not return enough to build them.
    pub fn page_urls(&self) -> Vec<String> {
        let (Some(base_url), Some(chapter)) = (self.base_url.as_deref(), self.chapter.as_ref()) else {
            return Vec::new();
        };
        let Some(hash) = chapter.hash.as_deref() else {
            return Vec::new();
        };

        chapter
            .data
            .iter()
            .map(|filename| format!("{}/data/{}/{}", base_url, hash, filename))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manga_keeps_unknown_attributes() {
        let manga: Manga = serde_json::from_value(json!({
            "id": "m1",
            "type": "manga",
            "attributes": {
                "title": {"ja-ro": "Shingeki", "en": "Attack on Titan"},
                "status": "completed",
                "isLocked": false,
                "tags": [{"id": "t1"}]
            },
            "relationships": [
                {"id": "a1", "type": "author"},
                {"id": "c1", "type": "cover_art"},
                {"id": "c2", "type": "cover_art"}
            ]
        }))
        .unwrap();

        assert_eq!(manga.display_title(), Some("Attack on Titan"));
        assert_eq!(manga.attributes.status.as_deref(), Some("completed"));
        assert_eq!(manga.attributes.extra["isLocked"], json!(false));
        assert_eq!(manga.cover_relationship().map(|r| r.id.as_str()), Some("c1"));

        let back = serde_json::to_value(&manga).unwrap();
        assert_eq!(back["attributes"]["tags"][0]["id"], "t1");
        assert!(back.get("coverFileName").is_none());
    }

    #[test]
    fn test_empty_localized_strings_sent_as_arrays() {
        let manga: Manga = serde_json::from_value(json!({
            "id": "m2",
            "attributes": {
                "title": {"en": "Vagabond", "ja": null},
                "altTitles": [[], {"ja": "バガボンド"}],
                "description": []
            }
        }))
        .unwrap();

        assert_eq!(manga.display_title(), Some("Vagabond"));
        assert_eq!(manga.attributes.title.len(), 1);
        assert!(manga.attributes.description.is_empty());
        assert_eq!(manga.attributes.alt_titles.len(), 2);
        assert!(manga.attributes.alt_titles[0].is_empty());
        assert_eq!(manga.attributes.alt_titles[1]["ja"], "バガボンド");
        assert!(manga.attributes.extra.is_empty());
    }

    #[test]
    fn test_cover_file_name_serializes_camel_case() {
        let manga: Manga = serde_json::from_value(json!({"id": "m1"})).unwrap();
        let enriched = manga.with_cover_file_name(Some("cover.jpg".to_string()));

        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["coverFileName"], "cover.jpg");
        assert_eq!(
            enriched.cover_url().as_deref(),
            Some("https://uploads.mangadex.org/covers/m1/cover.jpg")
        );
        assert_eq!(manga.cover_url(), None);
    }

    #[test]
    fn test_collection_without_data_is_empty() {
        let list: Collection<Manga> = serde_json::from_value(json!({"result": "ok"})).unwrap();
        assert!(list.data.is_empty());

        let entity: Entity<Manga> = serde_json::from_value(json!({"result": "ok"})).unwrap();
        assert!(entity.data.is_none());
    }

    #[test]
    fn test_page_urls() {
        let server: AtHomeServer = serde_json::from_value(json!({
            "baseUrl": "https://x",
            "chapter": {"hash": "h", "data": ["a.png", "b.png"], "dataSaver": ["a.jpg"]}
        }))
        .unwrap();

        assert_eq!(
            server.page_urls(),
            vec!["https://x/data/h/a.png", "https://x/data/h/b.png"]
        );
    }

    #[test]
    fn test_page_urls_missing_parts() {
        let no_base: AtHomeServer =
            serde_json::from_value(json!({"chapter": {"hash": "h", "data": ["a.png"]}})).unwrap();
        assert!(no_base.page_urls().is_empty());

        let no_chapter: AtHomeServer = serde_json::from_value(json!({"baseUrl": "https://x"})).unwrap();
        assert!(no_chapter.page_urls().is_empty());

        let no_hash: AtHomeServer =
            serde_json::from_value(json!({"baseUrl": "https://x", "chapter": {"data": ["a.png"]}})).unwrap();
        assert!(no_hash.page_urls().is_empty());
    }
}
