pub mod google_books;
pub mod gutendex;
pub mod open_library;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::book::Book;

pub use google_books::GoogleBooks;
pub use gutendex::Gutendex;
pub use open_library::OpenLibrary;

/// Stable identifier for an external catalog, used in cache keys and in the
/// aggregator's source filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceId {
    Google,
    OpenLibrary,
    Gutendex,
}

impl SourceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Google => "google",
            SourceId::OpenLibrary => "openlib",
            SourceId::Gutendex => "gutendex",
        }
    }

    /// Human-readable origin tag carried on every Book from this source.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::Google => "Google Books",
            SourceId::OpenLibrary => "Open Library",
            SourceId::Gutendex => "Project Gutenberg",
        }
    }
}

/// One external catalog. `search` never fails upward: network and parse
/// errors are logged inside the adapter and collapse to an empty list, so a
/// broken source degrades the aggregate instead of aborting it.
#[async_trait]
pub trait BookSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn search(&self, query: &str, max_results: usize) -> Vec<Book>;

    /// Popularity-ordered listing used by the free-books aggregate. Sources
    /// without a meaningful notion of "popular free texts" return nothing.
    async fn popular(&self, _limit: usize, _offset: usize) -> Vec<Book> {
        Vec::new()
    }
}

/// Fixed-interval request pacer. Adapters that talk to rate-limited APIs
/// await `pace()` before each outgoing request so courtesy delays live at
/// the adapter layer, not in orchestration code.
pub struct Pacer {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    pub async fn pace(&self) {
        let wait = {
            let mut slot = self.next_slot.lock().expect("pacer lock poisoned");
            let now = Instant::now();
            match *slot {
                Some(next) if next > now => {
                    *slot = Some(next + self.min_interval);
                    next - now
                }
                _ => {
                    *slot = Some(now + self.min_interval);
                    Duration::ZERO
                }
            }
        };
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
