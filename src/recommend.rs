use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::aggregator::Aggregator;
use crate::book::{dedupe_books, Book};
use crate::catalog;
use crate::classifier::{self, Mood, FRANCHISES};
use crate::error::{Result, VaultError};

/// Target recommendation count per request.
pub const RECOMMEND_TARGET: usize = 5;
/// Below this many unique books the orchestrator keeps trying fallback
/// genre terms.
pub const MIN_UNIQUE_RESULTS: usize = 3;

/// A finished recommendation: the mood that drove it plus the picks.
#[derive(Debug)]
pub struct Recommendation {
    pub mood: Mood,
    pub books: Vec<Book>,
}

/// Mood-driven recommendation orchestrator. Result ordering is shuffled
/// through an injected RNG so production gets variety while tests pass a
/// fixed seed and assert exact output.
pub struct Recommender {
    aggregator: Arc<Aggregator>,
    rng: Mutex<StdRng>,
}

impl Recommender {
    pub fn new(aggregator: Arc<Aggregator>) -> Self {
        Self::with_rng(aggregator, StdRng::from_entropy())
    }

    pub fn with_rng(aggregator: Arc<Aggregator>, rng: StdRng) -> Self {
        Self {
            aggregator,
            rng: Mutex::new(rng),
        }
    }

    /// Recommend books for a free-text description and/or an explicit mood
    /// tag. At least one must be non-empty. An explicit mood wins over
    /// detection; a detected genre puts its own search term at the front of
    /// the walk and, for franchise keywords, filters the franchise's own
    /// titles back out of the picks.
    pub async fn recommend(&self, user_input: &str, explicit_mood: &str) -> Result<Recommendation> {
        let user_input = user_input.trim();
        let explicit_mood = explicit_mood.trim();
        if user_input.is_empty() && explicit_mood.is_empty() {
            return Err(VaultError::InvalidInput(
                "please provide a mood or describe what you feel like reading".to_string(),
            ));
        }

        let mood = match Mood::parse(explicit_mood) {
            Some(mood) => mood,
            None => classifier::detect_mood(user_input),
        };
        let genre_hit = classifier::detect_genre(user_input);
        tracing::info!(%mood, genre = ?genre_hit.as_ref().map(|g| g.genre), "recommending");

        let mut terms: Vec<&str> = Vec::new();
        if let Some(hit) = &genre_hit {
            terms.push(hit.keyword);
        }
        terms.extend(catalog::genre_terms(mood));

        let excluded_franchise = genre_hit
            .as_ref()
            .map(|g| g.keyword)
            .filter(|k| FRANCHISES.contains(k));

        // The primary term alone is enough when it clears the uniqueness
        // floor; otherwise fallback terms accumulate until the full target
        // is reached or the list runs out.
        let mut picks: Vec<Book> = Vec::new();
        for (i, term) in terms.iter().enumerate() {
            let mut batch = self.aggregator.search_primary(term, RECOMMEND_TARGET).await;
            if let Some(franchise) = excluded_franchise {
                batch.retain(|b| !b.title.to_lowercase().contains(franchise));
            }
            picks.extend(batch);
            picks = dedupe_books(picks);
            if i == 0 && picks.len() >= MIN_UNIQUE_RESULTS {
                break;
            }
            if picks.len() >= RECOMMEND_TARGET {
                break;
            }
        }

        if picks.is_empty() {
            return Err(VaultError::NoResults(format!(
                "no books found for mood '{}', try different wording",
                mood
            )));
        }

        picks.truncate(RECOMMEND_TARGET);
        self.shuffle(&mut picks);
        Ok(Recommendation { mood, books: picks })
    }

    /// Top books for one curated genre: exact-title lookups from the curated
    /// list first, shortfall filled from a subject search minus titles
    /// already collected. Unknown genres fail with the valid-genre list so
    /// no adapter is ever consulted for garbage.
    pub async fn top_books_by_genre(&self, genre: &str, limit: usize) -> Result<Vec<Book>> {
        let titles = catalog::curated_titles(genre).ok_or_else(|| {
            VaultError::InvalidInput(format!(
                "unknown genre '{}', valid genres: {}",
                genre,
                catalog::genre_names().join(", ")
            ))
        })?;

        let mut books: Vec<Book> = Vec::new();
        for title in titles.iter().take(limit) {
            let found = self
                .aggregator
                .search_primary(&format!("intitle:\"{}\"", title), 1)
                .await;
            books.extend(found);
            books = dedupe_books(books);
            if books.len() >= limit {
                break;
            }
        }

        if books.len() < limit {
            let mut filler = self.aggregator.search_genre(genre, limit * 2).await;
            filler.retain(|candidate| {
                !books
                    .iter()
                    .any(|b| b.dedup_key() == candidate.dedup_key())
            });
            books.extend(filler);
        }
        books.truncate(limit);
        Ok(books)
    }

    /// Top books across every curated genre, `per_genre` from each.
    pub async fn top_books_all(&self, per_genre: usize) -> Result<Vec<(String, Vec<Book>)>> {
        let mut shelves = Vec::new();
        for genre in catalog::genre_names() {
            let books = self.top_books_by_genre(genre, per_genre).await?;
            shelves.push((genre.to_string(), books));
        }
        Ok(shelves)
    }

    /// Genre-page recommendations: subject search shuffled for variety.
    pub async fn recommend_by_genre(&self, genre: &str, limit: usize) -> Result<Vec<Book>> {
        if catalog::curated_titles(genre).is_none() {
            return Err(VaultError::InvalidInput(format!(
                "unknown genre '{}', valid genres: {}",
                genre,
                catalog::genre_names().join(", ")
            )));
        }
        let mut books = self.aggregator.search_genre(genre, limit * 2).await;
        if books.is_empty() {
            return Err(VaultError::NoResults(format!(
                "no books found for genre '{}'",
                genre
            )));
        }
        self.shuffle(&mut books);
        books.truncate(limit);
        Ok(books)
    }

    fn shuffle(&self, books: &mut [Book]) {
        let mut rng = self.rng.lock().expect("rng lock poisoned");
        books.shuffle(&mut *rng);
    }
}
