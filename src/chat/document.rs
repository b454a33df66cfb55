// src/chat/document.rs
//! Documents returned by the RAG backend.
//!
//! Metadata from the backend is loosely typed. The fields the UI cares about
//! are read leniently (a number where a string was expected is stringified,
//! anything else becomes `None`) and every other key is kept as-is in `extra`,
//! so a document survives a save/load cycle untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::message::Source;
use crate::util::string::StringUtils;

pub const UNKNOWN_DOCUMENT: &str = "Unknown Document";
pub const UNKNOWN_COLLECTION: &str = "Unknown Collection";

/// Characters of `page_content` shown in a collapsed card (and in a source snippet)
pub const PREVIEW_CHARS: usize = 200;
/// Characters shown once a card is expanded
pub const EXPANDED_PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default)]
    pub page_content: String,
    #[serde(default, rename = "type")]
    pub doc_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "_id", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub document_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub document_title: Option<String>,
    #[serde(rename = "_collection_name", default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "lenient_index", skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

impl DocumentMetadata {
    /// document_title, then document_name, then a fixed label
    pub fn title(&self) -> &str {
        non_empty(&self.document_title)
            .or_else(|| non_empty(&self.document_name))
            .unwrap_or(UNKNOWN_DOCUMENT)
    }

    pub fn document_name(&self) -> &str {
        self.document_name.as_deref().unwrap_or("")
    }

    pub fn collection(&self) -> &str {
        non_empty(&self.collection_name).unwrap_or(UNKNOWN_COLLECTION)
    }

    pub fn heading(&self) -> Option<&str> {
        non_empty(&self.heading)
    }

    pub fn chunk_index(&self) -> Option<i64> {
        self.chunk_index
    }
}

impl Document {
    /// Stable key within one answer: metadata `_id`, else `doc-{index}`.
    pub fn source_id(&self, index: usize) -> String {
        non_empty(&self.metadata.id)
            .map(str::to_string)
            .unwrap_or_else(|| format!("doc-{}", index))
    }

    pub fn preview(&self, expanded: bool) -> String {
        let limit = if expanded { EXPANDED_PREVIEW_CHARS } else { PREVIEW_CHARS };
        StringUtils::truncate_chars(&self.page_content, limit)
    }

    pub fn to_source(&self, index: usize) -> Source {
        Source {
            id: self.source_id(index),
            title: self.metadata.title().to_string(),
            url: format!("#{}", self.metadata.document_name()),
            snippet: StringUtils::truncate_chars(&self.page_content, PREVIEW_CHARS),
            relevance: (0.9 - 0.1 * index as f64).max(0.0),
        }
    }
}

pub fn docs_to_sources(docs: &[Document]) -> Vec<Source> {
    docs.iter()
        .enumerate()
        .map(|(index, doc)| doc.to_source(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with_content(content: String) -> Document {
        Document {
            id: None,
            metadata: DocumentMetadata::default(),
            page_content: content,
            doc_type: "Document".to_string(),
        }
    }

    #[test]
    fn test_preview_collapsed_and_expanded() {
        let content: String = "x".repeat(350);
        let doc = doc_with_content(content.clone());

        let collapsed = doc.preview(false);
        assert_eq!(collapsed.chars().count(), 203);
        assert_eq!(collapsed, format!("{}...", "x".repeat(200)));

        assert_eq!(doc.preview(true), content);

        let long = doc_with_content("y".repeat(1500));
        assert_eq!(long.preview(true), format!("{}...", "y".repeat(1000)));
    }

    #[test]
    fn test_backend_document_parses_and_keeps_unknown_keys() {
        let raw = json!({
            "id": null,
            "metadata": {
                "_data_point_fqn": "localdir:/data/section2.md",
                "_data_source_fqn": "localdir:/data",
                "document_name": "section2.md",
                "document_title": "Section 2",
                "_id": "abc-123",
                "_collection_name": "oma",
                "chunk_index": "4"
            },
            "page_content": "Section 2 covers architecture.",
            "type": "Document"
        });

        let doc: Document = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(doc.metadata.title(), "Section 2");
        assert_eq!(doc.metadata.collection(), "oma");
        assert_eq!(doc.metadata.chunk_index(), Some(4));
        assert_eq!(doc.metadata.extra["_data_point_fqn"], "localdir:/data/section2.md");

        let back = serde_json::to_value(&doc).unwrap();
        assert_eq!(back["metadata"]["_data_source_fqn"], raw["metadata"]["_data_source_fqn"]);
        assert_eq!(back["metadata"]["_id"], "abc-123");
    }

    #[test]
    fn test_malformed_metadata_falls_back() {
        let doc: Document = serde_json::from_value(json!({
            "metadata": { "document_title": ["not", "a", "string"], "_collection_name": 7 },
            "page_content": "text"
        }))
        .unwrap();

        assert_eq!(doc.metadata.title(), UNKNOWN_DOCUMENT);
        assert_eq!(doc.metadata.collection(), "7");
        assert_eq!(doc.metadata.heading(), None);
        assert_eq!(doc.source_id(2), "doc-2");
    }

    #[test]
    fn test_docs_to_sources_projection() {
        let mut first = doc_with_content("z".repeat(250));
        first.metadata.id = Some("first-id".to_string());
        first.metadata.document_name = Some("guide.md".to_string());
        let second = doc_with_content("short".to_string());

        let sources = docs_to_sources(&[first, second]);
        assert_eq!(sources[0].id, "first-id");
        assert_eq!(sources[0].title, "guide.md");
        assert_eq!(sources[0].url, "#guide.md");
        assert_eq!(sources[0].snippet, format!("{}...", "z".repeat(200)));
        assert!((sources[0].relevance - 0.9).abs() < 1e-9);

        assert_eq!(sources[1].id, "doc-1");
        assert_eq!(sources[1].title, UNKNOWN_DOCUMENT);
        assert_eq!(sources[1].snippet, "short");
        assert!((sources[1].relevance - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_relevance_never_negative() {
        let docs: Vec<Document> = (0..12).map(|_| doc_with_content(String::new())).collect();
        let sources = docs_to_sources(&docs);
        assert!(sources.iter().all(|s| (0.0..=1.0).contains(&s.relevance)));
        assert_eq!(sources[11].relevance, 0.0);
    }
}
