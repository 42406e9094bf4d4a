use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Book metadata aggregation and mood-based recommendations
#[derive(Parser)]
#[command(name = "bookvault")]
#[command(about = "Search, aggregate and recommend books from public catalogs", long_about = None)]
pub struct Cli {
    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,
    /// Search all catalogs for a query
    Search {
        /// Query to search for
        query: String,
        /// Restrict to a single source (google, openlib, gutendex)
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Recommend books for a mood or free-text description
    Recommend {
        /// Describe what you feel like reading
        text: Option<String>,
        /// Explicit mood tag (happy, dark, sci_fi, ...)
        #[arg(short, long)]
        mood: Option<String>,
    },
    /// Show curated top books for a genre
    TopBooks {
        /// Genre name
        genre: String,
        /// How many books to fetch
        #[arg(short, long, default_value_t = 6)]
        limit: usize,
    },
    /// List the curated genres
    Genres,
    /// List popular freely readable books
    FreeBooks,
}
