//! bookvault: multi-source book metadata aggregation with caching,
//! deduplication and mood-based recommendations.
//!
//! Three public catalogs are consulted through a common [`sources::BookSource`]
//! trait: Google Books (primary), Open Library and Project Gutenberg via
//! Gutendex. The [`aggregator::Aggregator`] merges their results with a tiered
//! fast path, and the [`recommend::Recommender`] turns free-text mood
//! descriptions into book picks on top of it.

pub mod aggregator;
pub mod book;
pub mod cache;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod recommend;
pub mod server;
pub mod sources;

use std::sync::Arc;

use anyhow::Result;

use aggregator::Aggregator;
use cache::SearchCache;
use config::Config;
use recommend::Recommender;
use sources::{BookSource, GoogleBooks, Gutendex, OpenLibrary};

pub use book::Book;
pub use error::VaultError;

/// Assembled service: the three real source adapters behind one aggregator
/// and recommender, sharing a reqwest client and a cache.
pub struct BookVault {
    pub config: Config,
    pub aggregator: Arc<Aggregator>,
    pub recommender: Arc<Recommender>,
}

impl BookVault {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("bookvault/", env!("CARGO_PKG_VERSION")))
            .build()?;
        // Declaration order is the aggregation priority: Google Books is the
        // primary and gets the fast path.
        let sources: Vec<Arc<dyn BookSource>> = vec![
            Arc::new(GoogleBooks::new(client.clone())),
            Arc::new(OpenLibrary::new(client.clone())),
            Arc::new(Gutendex::new(client)),
        ];
        let aggregator = Arc::new(Aggregator::new(
            sources,
            Arc::new(SearchCache::new()),
            config.ttls,
            config.source_timeout,
        ));
        let recommender = Arc::new(Recommender::new(aggregator.clone()));
        Ok(Self {
            config,
            aggregator,
            recommender,
        })
    }

    pub fn app_state(&self) -> server::AppState {
        server::AppState {
            aggregator: self.aggregator.clone(),
            recommender: self.recommender.clone(),
            ai_enabled: self.config.ai_api_key.is_some(),
        }
    }
}
