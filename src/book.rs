use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Canonical book record. Every adapter normalizes its provider's payload
/// into this shape; nothing provider-specific survives past the adapter.
///
/// Invariants: `title` and `authors` are never empty, `description` is never
/// empty, `rating` is `None` when the provider has no rating data (distinct
/// from a rating of 0). Records are constructed once and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: String,
    pub thumbnail: String,
    pub rating: Option<f32>,
    pub rating_count: u32,
    pub published_date: String,
    pub page_count: u32,
    pub categories: Vec<String>,
    pub language: String,
    pub preview_link: String,
    pub info_link: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_count: Option<u64>,
}

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const DEFAULT_LANGUAGE: &str = "en";

impl Book {
    /// Dedup key: normalized title + primary author. Empty when the title
    /// normalizes to nothing, which marks the record as undisplayable.
    pub fn dedup_key(&self) -> String {
        let title = self.title.trim().to_lowercase();
        if title.is_empty() {
            return String::new();
        }
        let author = self
            .authors
            .first()
            .map(|a| a.trim().to_lowercase())
            .unwrap_or_default();
        format!("{}|{}", title, author)
    }
}

/// Provider-native id prefixed with the source tag; random fallback when the
/// provider supplies nothing usable.
pub fn compose_id(source: &str, native: Option<&str>) -> String {
    match native.filter(|s| !s.trim().is_empty()) {
        Some(native) => format!("{}-{}", source, native),
        None => format!("{}-{}", source, uuid::Uuid::new_v4()),
    }
}

/// Synthesize a description from up to 3 metadata fragments, each rendered
/// as "Label: value", joined by ". " with a trailing period. Falls back to
/// `generic` when no fragments are available.
pub fn synthesize_description(fragments: &[(&str, String)], generic: &str) -> String {
    let parts: Vec<String> = fragments
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .take(3)
        .map(|(label, v)| format!("{}: {}", label, v))
        .collect();
    if parts.is_empty() {
        generic.to_string()
    } else {
        format!("{}.", parts.join(". "))
    }
}

/// Stable dedup: first occurrence of each (title, primary author) key wins;
/// records whose title key is empty are dropped outright.
pub fn dedupe_books(books: Vec<Book>) -> Vec<Book> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(books.len());
    for book in books {
        let key = book.dedup_key();
        if key.is_empty() {
            continue;
        }
        if seen.insert(key) {
            unique.push(book);
        }
    }
    unique
}

#[cfg(test)]
pub(crate) fn test_book(title: &str, author: &str) -> Book {
    Book {
        id: compose_id("test", Some(title)),
        title: title.to_string(),
        authors: vec![author.to_string()],
        description: "A test book.".to_string(),
        thumbnail: String::new(),
        rating: None,
        rating_count: 0,
        published_date: String::new(),
        page_count: 0,
        categories: Vec::new(),
        language: DEFAULT_LANGUAGE.to_string(),
        preview_link: String::new(),
        info_link: String::new(),
        source: "Test".to_string(),
        download_count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_normalizes_title_and_author() {
        let b = test_book("  The Hobbit ", " J.R.R. Tolkien ");
        assert_eq!(b.dedup_key(), "the hobbit|j.r.r. tolkien");
    }

    #[test]
    fn dedup_preserves_first_occurrence() {
        let mut first = test_book("Dune", "Frank Herbert");
        first.source = "Google Books".to_string();
        let mut second = test_book("DUNE", "frank herbert");
        second.source = "Open Library".to_string();
        let out = dedupe_books(vec![first, test_book("1984", "George Orwell"), second]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].source, "Google Books");
        assert_eq!(out[1].title, "1984");
    }

    #[test]
    fn dedup_is_idempotent() {
        let books = vec![
            test_book("Dune", "Frank Herbert"),
            test_book("Dune", "Frank Herbert"),
            test_book("1984", "George Orwell"),
        ];
        let once = dedupe_books(books);
        let twice = dedupe_books(once.clone());
        assert_eq!(once.len(), twice.len());
        let keys: Vec<_> = once.iter().map(|b| b.dedup_key()).collect();
        let keys2: Vec<_> = twice.iter().map(|b| b.dedup_key()).collect();
        assert_eq!(keys, keys2);
    }

    #[test]
    fn dedup_drops_empty_title_keys() {
        let mut blank = test_book("   ", "Nobody");
        blank.title = "   ".to_string();
        let out = dedupe_books(vec![blank, test_book("Dune", "Frank Herbert")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "Dune");
    }

    #[test]
    fn synthesized_description_joins_fragments() {
        let desc = synthesize_description(
            &[
                ("Category", "Fiction".to_string()),
                ("Published", "1965".to_string()),
                ("Pages", "412 pages".to_string()),
                ("Extra", "ignored".to_string()),
            ],
            "A captivating book worth reading.",
        );
        assert_eq!(desc, "Category: Fiction. Published: 1965. Pages: 412 pages.");
    }

    #[test]
    fn synthesized_description_falls_back_when_empty() {
        let desc = synthesize_description(&[("Category", String::new())], "Generic sentence.");
        assert_eq!(desc, "Generic sentence.");
    }

    #[test]
    fn compose_id_uses_native_id_when_present() {
        assert_eq!(compose_id("google", Some("abc123")), "google-abc123");
        let fallback = compose_id("google", None);
        assert!(fallback.starts_with("google-"));
        assert!(fallback.len() > "google-".len());
    }
}
