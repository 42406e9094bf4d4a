use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::book::{
    compose_id, synthesize_description, Book, DEFAULT_LANGUAGE, UNKNOWN_AUTHOR, UNTITLED,
};
use crate::sources::{BookSource, SourceId};

const BASE_URL: &str = "https://openlibrary.org/search.json";
const COVER_URL: &str = "https://covers.openlibrary.org/b/id/";
const SITE_URL: &str = "https://openlibrary.org";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<Doc>,
}

#[derive(Debug, Deserialize)]
struct Doc {
    key: Option<String>,
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    cover_i: Option<u64>,
    // Either a list of strings or a typed-text object depending on the work.
    first_sentence: Option<serde_json::Value>,
    #[serde(default)]
    subject: Vec<String>,
    first_publish_year: Option<i64>,
    number_of_pages_median: Option<u32>,
    #[serde(default)]
    language: Vec<String>,
    #[serde(default)]
    ia: Vec<String>,
}

/// Library-union catalog: slower than the primary but strong on older and
/// obscure titles. Consulted on fan-out and for the free-books aggregate.
pub struct OpenLibrary {
    client: reqwest::Client,
    base_url: String,
}

impl OpenLibrary {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<Vec<Book>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let payload: SearchResponse = response.json().await?;
        Ok(payload.docs.into_iter().map(map_doc).collect())
    }
}

#[async_trait]
impl BookSource for OpenLibrary {
    fn id(&self) -> SourceId {
        SourceId::OpenLibrary
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<Book> {
        let params = [
            ("q", query.to_string()),
            ("limit", max_results.to_string()),
        ];
        match self.fetch(&params).await {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(source = "openlib", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    /// Freely readable works, most-downloaded first. Entries with an Internet
    /// Archive scan get a direct archive.org read link.
    async fn popular(&self, limit: usize, _offset: usize) -> Vec<Book> {
        let params = [
            ("q", "ebook".to_string()),
            ("has_fulltext", "true".to_string()),
            ("limit", limit.to_string()),
            ("sort", "downloads desc".to_string()),
        ];
        match self.fetch(&params).await {
            Ok(mut books) => {
                books.truncate(limit);
                books
            }
            Err(e) => {
                tracing::warn!(source = "openlib", error = %e, "free-books fetch failed");
                Vec::new()
            }
        }
    }
}

fn first_sentence_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(first_sentence_text),
        serde_json::Value::Object(map) => {
            map.get("value").and_then(|v| v.as_str()).map(String::from)
        }
        _ => None,
    }
}

fn map_doc(doc: Doc) -> Book {
    let thumbnail = doc
        .cover_i
        .map(|id| format!("{}{}-L.jpg", COVER_URL, id))
        .unwrap_or_default();
    let work_link = doc
        .key
        .as_deref()
        .map(|key| format!("{}{}", SITE_URL, key))
        .unwrap_or_default();
    let preview_link = doc
        .ia
        .first()
        .map(|ia| format!("https://archive.org/details/{}", ia))
        .unwrap_or_else(|| work_link.clone());
    let description = doc
        .first_sentence
        .as_ref()
        .and_then(first_sentence_text)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| {
            synthesize_description(
                &[
                    ("Genre", doc.subject.first().cloned().unwrap_or_default()),
                    (
                        "First published",
                        doc.first_publish_year
                            .map(|y| y.to_string())
                            .unwrap_or_default(),
                    ),
                    (
                        "Pages",
                        doc.number_of_pages_median
                            .map(|p| p.to_string())
                            .unwrap_or_default(),
                    ),
                ],
                "An interesting book covering various topics.",
            )
        });
    let authors = if doc.author_name.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        doc.author_name
    };
    Book {
        id: compose_id(SourceId::OpenLibrary.as_str(), doc.key.as_deref()),
        title: doc
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        authors,
        description,
        thumbnail,
        rating: None,
        rating_count: 0,
        published_date: doc
            .first_publish_year
            .map(|y| y.to_string())
            .unwrap_or_default(),
        page_count: doc.number_of_pages_median.unwrap_or(0),
        categories: doc.subject,
        language: doc
            .language
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        preview_link,
        info_link: work_link,
        source: SourceId::OpenLibrary.display_name().to_string(),
        download_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_doc_with_cover_and_first_sentence() {
        let raw = serde_json::json!({
            "key": "/works/OL27448W",
            "title": "The Lord of the Rings",
            "author_name": ["J. R. R. Tolkien"],
            "cover_i": 9255566,
            "first_sentence": ["When Mr. Bilbo Baggins announced..."],
            "subject": ["Fantasy fiction"],
            "first_publish_year": 1954,
            "number_of_pages_median": 1193,
            "language": ["eng"]
        });
        let doc: Doc = serde_json::from_value(raw).unwrap();
        let book = map_doc(doc);
        assert_eq!(book.id, "openlib-/works/OL27448W");
        assert_eq!(book.thumbnail, "https://covers.openlibrary.org/b/id/9255566-L.jpg");
        assert_eq!(book.description, "When Mr. Bilbo Baggins announced...");
        assert_eq!(book.published_date, "1954");
        assert_eq!(book.info_link, "https://openlibrary.org/works/OL27448W");
        assert_eq!(book.source, "Open Library");
    }

    #[test]
    fn synthesizes_description_and_defaults_author() {
        let raw = serde_json::json!({
            "key": "/works/OL1W",
            "title": "Obscure Tome",
            "subject": ["Philosophy"],
            "first_publish_year": 1883
        });
        let doc: Doc = serde_json::from_value(raw).unwrap();
        let book = map_doc(doc);
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert_eq!(book.description, "Genre: Philosophy. First published: 1883.");
    }

    #[test]
    fn typed_text_first_sentence_is_accepted() {
        let value = serde_json::json!({ "type": "/type/text", "value": "It begins." });
        assert_eq!(first_sentence_text(&value), Some("It begins.".to_string()));
    }

    #[test]
    fn internet_archive_scan_becomes_read_link() {
        let raw = serde_json::json!({
            "key": "/works/OL2W",
            "title": "Free Classic",
            "author_name": ["Someone"],
            "ia": ["freeclassic00some"]
        });
        let doc: Doc = serde_json::from_value(raw).unwrap();
        let book = map_doc(doc);
        assert_eq!(book.preview_link, "https://archive.org/details/freeclassic00some");
    }
}
