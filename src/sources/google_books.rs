use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use crate::book::{
    compose_id, synthesize_description, Book, DEFAULT_LANGUAGE, UNKNOWN_AUTHOR, UNTITLED,
};
use crate::sources::{BookSource, Pacer, SourceId};

const BASE_URL: &str = "https://www.googleapis.com/books/v1/volumes";
const GENERIC_DESCRIPTION: &str = "A captivating book worth reading.";

/// Minimum spacing between outgoing requests. The volumes API throttles
/// bursts from unauthenticated clients, and the top-books path issues one
/// lookup per curated title.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

// Provider payload, modeled at the adapter boundary only.

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<VolumeItem>,
}

#[derive(Debug, Deserialize)]
struct VolumeItem {
    id: Option<String>,
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
    #[serde(rename = "averageRating")]
    average_rating: Option<f32>,
    #[serde(rename = "ratingsCount")]
    ratings_count: Option<u32>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    #[serde(rename = "pageCount")]
    page_count: Option<u32>,
    #[serde(default)]
    categories: Vec<String>,
    language: Option<String>,
    #[serde(rename = "previewLink")]
    preview_link: Option<String>,
    #[serde(rename = "infoLink")]
    info_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
    #[serde(rename = "smallThumbnail")]
    small_thumbnail: Option<String>,
}

/// Primary source: fast, rich metadata across all categories.
pub struct GoogleBooks {
    client: reqwest::Client,
    base_url: String,
    pacer: Pacer,
}

impl GoogleBooks {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            pacer: Pacer::new(MIN_REQUEST_INTERVAL),
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<Book>> {
        self.pacer.pace().await;
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("maxResults", &max_results.to_string()),
                ("langRestrict", "en"),
                ("orderBy", "relevance"),
            ])
            .send()
            .await?
            .error_for_status()?;
        let payload: VolumesResponse = response.json().await?;
        Ok(payload.items.into_iter().map(map_volume).collect())
    }
}

#[async_trait]
impl BookSource for GoogleBooks {
    fn id(&self) -> SourceId {
        SourceId::Google
    }

    async fn search(&self, query: &str, max_results: usize) -> Vec<Book> {
        match self.fetch(query, max_results).await {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(source = "google", query, error = %e, "search failed");
                Vec::new()
            }
        }
    }
}

fn map_volume(item: VolumeItem) -> Book {
    let info = item.volume_info;
    let description = match info.description.filter(|d| !d.trim().is_empty()) {
        Some(d) => d,
        None => synthesize_description(
            &[
                ("Category", info.categories.first().cloned().unwrap_or_default()),
                ("Published", info.published_date.clone().unwrap_or_default()),
                (
                    "Pages",
                    info.page_count.map(|p| p.to_string()).unwrap_or_default(),
                ),
            ],
            GENERIC_DESCRIPTION,
        ),
    };
    let thumbnail = info
        .image_links
        .and_then(|l| l.thumbnail.or(l.small_thumbnail))
        .unwrap_or_default();
    let authors = if info.authors.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        info.authors
    };
    Book {
        id: compose_id(SourceId::Google.as_str(), item.id.as_deref()),
        title: info
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNTITLED.to_string()),
        authors,
        description,
        thumbnail,
        rating: info.average_rating.map(|r| r.clamp(0.0, 5.0)),
        rating_count: info.ratings_count.unwrap_or(0),
        published_date: info.published_date.unwrap_or_default(),
        page_count: info.page_count.unwrap_or(0),
        categories: info.categories,
        language: info
            .language
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        preview_link: info.preview_link.unwrap_or_default(),
        info_link: info.info_link.unwrap_or_default(),
        source: SourceId::Google.display_name().to_string(),
        download_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_full_volume_payload() {
        let raw = serde_json::json!({
            "id": "zyTCAlFPjgYC",
            "volumeInfo": {
                "title": "The Google Story",
                "authors": ["David A. Vise", "Mark Malseed"],
                "description": "An inside look.",
                "imageLinks": { "thumbnail": "http://img/thumb.jpg" },
                "averageRating": 3.5,
                "ratingsCount": 136,
                "publishedDate": "2005-11-15",
                "pageCount": 207,
                "categories": ["Business & Economics"],
                "language": "en",
                "previewLink": "http://preview",
                "infoLink": "http://info"
            }
        });
        let item: VolumeItem = serde_json::from_value(raw).unwrap();
        let book = map_volume(item);
        assert_eq!(book.id, "google-zyTCAlFPjgYC");
        assert_eq!(book.title, "The Google Story");
        assert_eq!(book.authors.len(), 2);
        assert_eq!(book.rating, Some(3.5));
        assert_eq!(book.rating_count, 136);
        assert_eq!(book.source, "Google Books");
    }

    #[test]
    fn defaults_and_synthesized_description_for_sparse_payload() {
        let raw = serde_json::json!({
            "volumeInfo": {
                "publishedDate": "1999",
                "pageCount": 320
            }
        });
        let item: VolumeItem = serde_json::from_value(raw).unwrap();
        let book = map_volume(item);
        assert!(book.id.starts_with("google-"));
        assert_eq!(book.title, UNTITLED);
        assert_eq!(book.authors, vec![UNKNOWN_AUTHOR.to_string()]);
        assert_eq!(book.description, "Published: 1999. Pages: 320.");
        assert_eq!(book.rating, None);
        assert_eq!(book.language, "en");
    }

    #[test]
    fn generic_description_when_no_fragments() {
        let raw = serde_json::json!({ "id": "x", "volumeInfo": {} });
        let item: VolumeItem = serde_json::from_value(raw).unwrap();
        let book = map_volume(item);
        assert_eq!(book.description, GENERIC_DESCRIPTION);
    }
}
