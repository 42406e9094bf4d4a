use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::book::{compose_id, Book, DEFAULT_LANGUAGE, UNKNOWN_AUTHOR, UNTITLED};
use crate::sources::{BookSource, SourceId};

const BASE_URL: &str = "https://gutendex.com/books";
const EBOOK_URL: &str = "https://www.gutenberg.org/ebooks";

/// Readable formats in preference order for the "Read Now" link.
const READABLE_FORMATS: [&str; 4] = [
    "text/html",
    "text/html; charset=utf-8",
    "text/plain; charset=utf-8",
    "text/plain",
];

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<Text>,
}

#[derive(Debug, Deserialize)]
struct Text {
    id: Option<i64>,
    title: Option<String>,
    #[serde(default)]
    authors: Vec<Person>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    languages: Vec<String>,
    #[serde(default)]
    formats: HashMap<String, String>,
    #[serde(default)]
    download_count: u64,
}

#[derive(Debug, Deserialize)]
struct Person {
    name: String,
}

/// Public-domain text index. Provides readable full-text links and download
/// popularity counts; never any rating data.
pub struct Gutendex {
    client: reqwest::Client,
    base_url: String,
}

impl Gutendex {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn fetch(&self, params: &[(&str, String)]) -> Result<Vec<Book>> {
        let url = format!("{}/", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await?
            .error_for_status()?;
        let payload: ListResponse = response.json().await?;
        Ok(payload.results.into_iter().map(map_text).collect())
    }
}

#[async_trait]
impl BookSource for Gutendex {
    fn id(&self) -> SourceId {
        SourceId::Gutendex
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<Book> {
        let params = [
            ("search", query.to_string()),
            ("limit", max_results.to_string()),
        ];
        match self.fetch(&params).await {
            Ok(mut books) => {
                books.truncate(max_results);
                books
            }
            Err(e) => {
                tracing::warn!(source = "gutendex", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }

    async fn popular(&self, limit: usize, offset: usize) -> Vec<Book> {
        let mut params = vec![
            ("languages", "en".to_string()),
            ("limit", limit.to_string()),
            ("sort", "popular".to_string()),
        ];
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }
        match self.fetch(&params).await {
            Ok(mut books) => {
                books.truncate(limit);
                books
            }
            Err(e) => {
                tracing::warn!(source = "gutendex", error = %e, "popular fetch failed");
                Vec::new()
            }
        }
    }
}

fn map_text(text: Text) -> Book {
    let native_id = text.id.map(|id| id.to_string());
    let author = if text.authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        text.authors
            .iter()
            .map(|p| p.name.clone())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let description = if !text.subjects.is_empty() {
        format!(
            "A classic book covering topics such as {}.",
            text.subjects
                .iter()
                .take(3)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        )
    } else if let Some(person) = text.authors.first() {
        format!("A timeless work by {}.", person.name)
    } else {
        "A classic literary work available for free reading.".to_string()
    };
    let info_link = native_id
        .as_deref()
        .map(|id| format!("{}/{}", EBOOK_URL, id))
        .unwrap_or_default();
    let preview_link = READABLE_FORMATS
        .iter()
        .find_map(|f| text.formats.get(*f).cloned())
        .unwrap_or_else(|| info_link.clone());
    Book {
        id: compose_id(SourceId::Gutendex.as_str(), native_id.as_deref()),
        title: text
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        authors: vec![author],
        description,
        thumbnail: text.formats.get("image/jpeg").cloned().unwrap_or_default(),
        rating: None,
        rating_count: 0,
        published_date: String::new(),
        page_count: 0,
        categories: text.subjects,
        language: text
            .languages
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        preview_link,
        info_link,
        source: SourceId::Gutendex.display_name().to_string(),
        download_count: Some(text.download_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_text_with_formats_and_download_count() {
        let raw = serde_json::json!({
            "id": 1342,
            "title": "Pride and Prejudice",
            "authors": [{ "name": "Austen, Jane" }],
            "subjects": ["Courtship -- Fiction", "England -- Fiction"],
            "languages": ["en"],
            "formats": {
                "image/jpeg": "https://gutenberg.org/cover.jpg",
                "text/html": "https://gutenberg.org/1342.html",
                "text/plain; charset=utf-8": "https://gutenberg.org/1342.txt"
            },
            "download_count": 48500
        });
        let text: Text = serde_json::from_value(raw).unwrap();
        let book = map_text(text);
        assert_eq!(book.id, "gutendex-1342");
        assert_eq!(book.authors, vec!["Austen, Jane".to_string()]);
        // HTML preferred over plain text for readability.
        assert_eq!(book.preview_link, "https://gutenberg.org/1342.html");
        assert_eq!(book.info_link, "https://www.gutenberg.org/ebooks/1342");
        assert_eq!(book.download_count, Some(48500));
        assert_eq!(book.rating, None);
        assert!(book
            .description
            .starts_with("A classic book covering topics such as"));
    }

    #[test]
    fn falls_back_to_author_description_and_ebook_link() {
        let raw = serde_json::json!({
            "id": 99,
            "title": "Letters",
            "authors": [{ "name": "Seneca" }],
            "formats": {}
        });
        let text: Text = serde_json::from_value(raw).unwrap();
        let book = map_text(text);
        assert_eq!(book.description, "A timeless work by Seneca.");
        assert_eq!(book.preview_link, "https://www.gutenberg.org/ebooks/99");
    }

    #[test]
    fn generic_description_without_authors_or_subjects() {
        let raw = serde_json::json!({ "title": "Anonymous Fragment" });
        let text: Text = serde_json::from_value(raw).unwrap();
        let book = map_text(text);
        assert_eq!(
            book.description,
            "A classic literary work available for free reading."
        );
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert!(book.id.starts_with("gutendex-"));
    }
}
