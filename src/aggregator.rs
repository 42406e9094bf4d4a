use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::book::{dedupe_books, Book};
use crate::cache::SearchCache;
use crate::sources::{BookSource, SourceId};

/// Primary-source result count at or above which the fan-out is skipped.
pub const PRIMARY_FAST_PATH_MIN: usize = 5;
/// How many primary results the fast path returns.
pub const FAST_PATH_CAP: usize = 15;
/// Hard cap on any aggregated result set.
pub const RESULT_CAP: usize = 20;
/// Free-books aggregate cap.
pub const FREE_BOOKS_CAP: usize = 100;

/// Which adapters a search consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFilter {
    All,
    Only(SourceId),
}

impl SourceFilter {
    fn selects(&self, id: SourceId) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::Only(want) => *want == id,
        }
    }
}

/// Freshness windows for the two cached result families.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub search: Duration,
    pub free_books: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search: Duration::from_secs(5 * 60),
            free_books: Duration::from_secs(30 * 60),
        }
    }
}

/// Multi-source aggregation engine. Sources are consulted in declaration
/// order; the first source is the primary and gets the fast path. The cache
/// is injected so callers (and tests) control its lifetime and contents.
pub struct Aggregator {
    sources: Vec<Arc<dyn BookSource>>,
    cache: Arc<SearchCache>,
    ttls: CacheTtls,
    source_timeout: Duration,
}

impl Aggregator {
    pub fn new(
        sources: Vec<Arc<dyn BookSource>>,
        cache: Arc<SearchCache>,
        ttls: CacheTtls,
        source_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            cache,
            ttls,
            source_timeout,
        }
    }

    fn primary(&self) -> Option<&Arc<dyn BookSource>> {
        self.sources.first()
    }

    /// Cached search against one source, bounded by the per-source timeout.
    async fn cached_search(
        &self,
        source: &Arc<dyn BookSource>,
        query: &str,
        limit: usize,
    ) -> Vec<Book> {
        let key = SearchCache::key(source.id().as_str(), query, limit);
        self.cache
            .get_or_fetch(&key, self.ttls.search, || async {
                match tokio::time::timeout(self.source_timeout, source.search(query, limit)).await
                {
                    Ok(books) => books,
                    Err(_) => {
                        tracing::warn!(
                            source = source.id().as_str(),
                            query,
                            "source timed out, treating as empty"
                        );
                        Vec::new()
                    }
                }
            })
            .await
    }

    /// Tiered multi-source search.
    ///
    /// Empty queries return nothing without touching any adapter. When the
    /// filter includes the primary source and it yields at least
    /// `PRIMARY_FAST_PATH_MIN` results, the first `FAST_PATH_CAP` of those
    /// are returned as-is. Otherwise every selected source is queried
    /// concurrently and the results are concatenated in declaration order
    /// (so primary results always outrank secondary ones), deduplicated, and
    /// capped at `RESULT_CAP`.
    pub async fn search_all(&self, query: &str, filter: SourceFilter) -> Vec<Book> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let mut primary_results = Vec::new();
        if let Some(primary) = self.primary() {
            if filter.selects(primary.id()) {
                primary_results = self.cached_search(primary, query, RESULT_CAP).await;
                if primary_results.len() >= PRIMARY_FAST_PATH_MIN {
                    tracing::debug!(query, count = primary_results.len(), "primary fast path");
                    primary_results.truncate(FAST_PATH_CAP);
                    return primary_results;
                }
            }
        }

        // Fan out to the remaining selected sources. join_all preserves the
        // declaration order regardless of which source settles first.
        let secondary = self
            .sources
            .iter()
            .skip(1)
            .filter(|s| filter.selects(s.id()));
        let fetches = secondary.map(|source| self.cached_search(source, query, RESULT_CAP));
        let batches = join_all(fetches).await;

        let mut combined = primary_results;
        for batch in batches {
            combined.extend(batch);
        }
        let mut books = dedupe_books(combined);
        books.truncate(RESULT_CAP);
        books
    }

    /// Cached primary-source lookup with a caller-chosen limit. Used for the
    /// exact-title fetches behind the curated top-books feed.
    pub async fn search_primary(&self, query: &str, limit: usize) -> Vec<Book> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        match self.primary() {
            Some(primary) => self.cached_search(primary, query, limit).await,
            None => Vec::new(),
        }
    }

    /// Subject-scoped primary search, e.g. `subject:fantasy`.
    pub async fn search_genre(&self, genre: &str, limit: usize) -> Vec<Book> {
        if genre.trim().is_empty() {
            return Vec::new();
        }
        self.search_primary(&format!("subject:{}", genre), limit)
            .await
    }

    /// Aggregate of freely readable books: two Gutendex popularity pages
    /// around an Open Library full-text batch, deduplicated and capped.
    /// Cached under its own longer TTL since the popular listings barely
    /// move.
    pub async fn free_books(&self) -> Vec<Book> {
        let key = SearchCache::key("free", "all", FREE_BOOKS_CAP);
        self.cache
            .get_or_fetch(&key, self.ttls.free_books, || self.fetch_free_books())
            .await
    }

    async fn fetch_free_books(&self) -> Vec<Book> {
        let gutendex = self.sources.iter().find(|s| s.id() == SourceId::Gutendex);
        let openlib = self
            .sources
            .iter()
            .find(|s| s.id() == SourceId::OpenLibrary);

        let (first, middle, tail) = tokio::join!(
            async {
                match gutendex {
                    Some(s) => self.bounded_popular(s, 35, 0).await,
                    None => Vec::new(),
                }
            },
            async {
                match openlib {
                    Some(s) => self.bounded_popular(s, 35, 0).await,
                    None => Vec::new(),
                }
            },
            async {
                match gutendex {
                    Some(s) => self.bounded_popular(s, 30, 35).await,
                    None => Vec::new(),
                }
            },
        );

        let mut combined = first;
        combined.extend(middle);
        combined.extend(tail);
        let mut books = dedupe_books(combined);
        books.truncate(FREE_BOOKS_CAP);
        tracing::info!(count = books.len(), "free-books aggregate refreshed");
        books
    }

    async fn bounded_popular(
        &self,
        source: &Arc<dyn BookSource>,
        limit: usize,
        offset: usize,
    ) -> Vec<Book> {
        match tokio::time::timeout(self.source_timeout, source.popular(limit, offset)).await {
            Ok(books) => books,
            Err(_) => {
                tracing::warn!(
                    source = source.id().as_str(),
                    "popular fetch timed out, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::test_book;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        id: SourceId,
        books: Vec<Book>,
        search_calls: AtomicUsize,
        popular_calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(id: SourceId, books: Vec<Book>) -> Arc<Self> {
            Arc::new(Self {
                id,
                books,
                search_calls: AtomicUsize::new(0),
                popular_calls: AtomicUsize::new(0),
            })
        }

        fn searches(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookSource for FakeSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn search(&self, _query: &str, max_results: usize) -> Vec<Book> {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            let mut books = self.books.clone();
            books.truncate(max_results);
            books
        }

        async fn popular(&self, limit: usize, offset: usize) -> Vec<Book> {
            self.popular_calls.fetch_add(1, Ordering::SeqCst);
            self.books
                .iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        }
    }

    fn shelf(prefix: &str, n: usize) -> Vec<Book> {
        (0..n)
            .map(|i| test_book(&format!("{} {}", prefix, i), "Author"))
            .collect()
    }

    fn aggregator(sources: Vec<Arc<dyn BookSource>>) -> Aggregator {
        Aggregator::new(
            sources,
            Arc::new(SearchCache::new()),
            CacheTtls::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn empty_query_calls_no_sources() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 10));
        let secondary = FakeSource::new(SourceId::OpenLibrary, shelf("o", 10));
        let agg = aggregator(vec![primary.clone(), secondary.clone()]);
        assert!(agg.search_all("   ", SourceFilter::All).await.is_empty());
        assert_eq!(primary.searches(), 0);
        assert_eq!(secondary.searches(), 0);
    }

    #[tokio::test]
    async fn fast_path_skips_secondaries() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 7));
        let secondary = FakeSource::new(SourceId::OpenLibrary, shelf("o", 10));
        let agg = aggregator(vec![primary.clone(), secondary.clone()]);
        let books = agg.search_all("dune", SourceFilter::All).await;
        assert_eq!(books.len(), 7);
        assert!(books.iter().all(|b| b.title.starts_with("g ")));
        assert_eq!(secondary.searches(), 0);
    }

    #[tokio::test]
    async fn fast_path_caps_at_fifteen() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 20));
        let agg = aggregator(vec![primary]);
        let books = agg.search_all("dune", SourceFilter::All).await;
        assert_eq!(books.len(), FAST_PATH_CAP);
    }

    #[tokio::test]
    async fn sparse_primary_triggers_ordered_fanout() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 2));
        let secondary = FakeSource::new(SourceId::OpenLibrary, shelf("o", 3));
        let tertiary = FakeSource::new(SourceId::Gutendex, shelf("p", 3));
        let agg = aggregator(vec![primary, secondary.clone(), tertiary]);
        let books = agg.search_all("rare title", SourceFilter::All).await;
        assert_eq!(books.len(), 8);
        // Primary results first, then secondaries in declaration order.
        assert!(books[0].title.starts_with("g "));
        assert!(books[2].title.starts_with("o "));
        assert!(books[5].title.starts_with("p "));
        assert_eq!(secondary.searches(), 1);
    }

    #[tokio::test]
    async fn fanout_dedupes_and_caps_at_twenty() {
        let overlap = shelf("same", 4);
        let primary = FakeSource::new(SourceId::Google, overlap.clone());
        let mut secondary_books = overlap;
        secondary_books.extend(shelf("extra", 30));
        let secondary = FakeSource::new(SourceId::OpenLibrary, secondary_books);
        let agg = aggregator(vec![primary, secondary]);
        let books = agg.search_all("overlap", SourceFilter::All).await;
        assert_eq!(books.len(), RESULT_CAP);
        let keys: std::collections::HashSet<_> = books.iter().map(|b| b.dedup_key()).collect();
        assert_eq!(keys.len(), books.len());
    }

    #[tokio::test]
    async fn repeated_search_within_ttl_hits_cache() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 7));
        let agg = aggregator(vec![primary.clone()]);
        agg.search_all("dune", SourceFilter::All).await;
        agg.search_all("dune", SourceFilter::All).await;
        assert_eq!(primary.searches(), 1);
    }

    #[tokio::test]
    async fn source_filter_limits_fanout() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 2));
        let secondary = FakeSource::new(SourceId::OpenLibrary, shelf("o", 3));
        let agg = aggregator(vec![primary.clone(), secondary.clone()]);
        let books = agg
            .search_all("dune", SourceFilter::Only(SourceId::OpenLibrary))
            .await;
        assert_eq!(primary.searches(), 0);
        assert_eq!(secondary.searches(), 1);
        assert_eq!(books.len(), 3);
    }

    #[tokio::test]
    async fn genre_search_scopes_to_subject_on_primary() {
        let primary = FakeSource::new(SourceId::Google, shelf("g", 3));
        let secondary = FakeSource::new(SourceId::OpenLibrary, shelf("o", 3));
        let agg = aggregator(vec![primary.clone(), secondary.clone()]);
        let books = agg.search_genre("fantasy", 10).await;
        assert_eq!(books.len(), 3);
        assert_eq!(primary.searches(), 1);
        assert_eq!(secondary.searches(), 0);
    }

    #[tokio::test]
    async fn free_books_aggregates_popular_listings() {
        let google = FakeSource::new(SourceId::Google, shelf("g", 5));
        let openlib = FakeSource::new(SourceId::OpenLibrary, shelf("free-o", 40));
        let gutendex = FakeSource::new(SourceId::Gutendex, shelf("free-p", 70));
        let agg = aggregator(vec![google.clone(), openlib.clone(), gutendex.clone()]);
        let books = agg.free_books().await;
        // 35 + 35 + 30 distinct titles.
        assert_eq!(books.len(), 100);
        assert_eq!(google.popular_calls.load(Ordering::SeqCst), 0);
        assert_eq!(openlib.popular_calls.load(Ordering::SeqCst), 1);
        assert_eq!(gutendex.popular_calls.load(Ordering::SeqCst), 2);

        // Second call inside the TTL is served from cache.
        agg.free_books().await;
        assert_eq!(gutendex.popular_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn timed_out_source_counts_as_empty() {
        struct SlowSource;

        #[async_trait]
        impl BookSource for SlowSource {
            fn id(&self) -> SourceId {
                SourceId::OpenLibrary
            }
            async fn search(&self, _query: &str, _max_results: usize) -> Vec<Book> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Vec::new()
            }
        }

        let primary = FakeSource::new(SourceId::Google, shelf("g", 2));
        let agg = Aggregator::new(
            vec![primary, Arc::new(SlowSource)],
            Arc::new(SearchCache::new()),
            CacheTtls::default(),
            Duration::from_millis(50),
        );
        let books = agg.search_all("dune", SourceFilter::All).await;
        assert_eq!(books.len(), 2);
    }
}
