mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bookvault::aggregator::SourceFilter;
use bookvault::config::Config;
use bookvault::sources::SourceId;
use bookvault::{Book, BookVault, VaultError};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env(),
    };
    let vault = BookVault::new(config)?;

    match cli.command {
        Commands::Serve => {
            let addr = vault.config.listen_addr();
            bookvault::server::serve(vault.app_state(), &addr).await?;
        }
        Commands::Search { query, source } => {
            let filter = match source.as_deref() {
                None => SourceFilter::All,
                Some("google") => SourceFilter::Only(SourceId::Google),
                Some("openlib") => SourceFilter::Only(SourceId::OpenLibrary),
                Some("gutendex") => SourceFilter::Only(SourceId::Gutendex),
                Some(other) => anyhow::bail!("unknown source '{}'", other),
            };
            let books = vault.aggregator.search_all(&query, filter).await;
            print_books(&books);
        }
        Commands::Recommend { text, mood } => {
            let text = text.unwrap_or_default();
            let mood = mood.unwrap_or_default();
            match vault.recommender.recommend(&text, &mood).await {
                Ok(rec) => {
                    println!("Mood: {}", rec.mood);
                    print_books(&rec.books);
                }
                Err(VaultError::InvalidInput(msg)) | Err(VaultError::NoResults(msg)) => {
                    eprintln!("{}", msg);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::TopBooks { genre, limit } => {
            match vault.recommender.top_books_by_genre(&genre, limit).await {
                Ok(books) => print_books(&books),
                Err(VaultError::InvalidInput(msg)) => eprintln!("{}", msg),
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Genres => {
            for genre in bookvault::catalog::genre_names() {
                println!("{}", genre);
            }
        }
        Commands::FreeBooks => {
            let books = vault.aggregator.free_books().await;
            print_books(&books);
        }
    }
    Ok(())
}

fn print_books(books: &[Book]) {
    if books.is_empty() {
        println!("No books found.");
        return;
    }
    for book in books {
        println!(
            "{} by {} [{}] (ID: {})",
            book.title,
            book.authors.join(", "),
            book.source,
            book.id
        );
    }
}
