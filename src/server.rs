use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::book::Book;
use crate::catalog;
use crate::error::VaultError;
use crate::recommend::Recommender;

pub const SERVICE_NAME: &str = "bookvault";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub recommender: Arc<Recommender>,
    pub ai_enabled: bool,
}

/// JSON error body: a short machine tag plus a human message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn into_api_error(err: VaultError) -> ApiError {
    let (status, tag) = match &err {
        VaultError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        VaultError::NoResults(_) => (StatusCode::NOT_FOUND, "no_results"),
        VaultError::Unexpected(e) => {
            tracing::error!(error = %e, "request failed unexpectedly");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    (
        status,
        Json(ErrorBody {
            error: tag,
            message: err.to_string(),
        }),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_input: String,
    #[serde(default)]
    pub mood: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub mood: String,
    pub recommendations: Vec<Book>,
    pub message: String,
}

async fn recommend(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let rec = state
        .recommender
        .recommend(&req.user_input, &req.mood)
        .await
        .map_err(into_api_error)?;
    let message = format!(
        "Here are some {} books picked for you.",
        rec.mood.as_str().replace('_', "-")
    );
    Ok(Json(RecommendResponse {
        mood: rec.mood.to_string(),
        recommendations: rec.books,
        message,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBooksQuery {
    pub genre: Option<String>,
    pub limit: Option<usize>,
    pub per_genre: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopBooksResponse {
    pub genre: String,
    pub books: Vec<Book>,
    pub count: usize,
}

/// All-genres shape: one flat book list plus the genre-name enumeration.
#[derive(Debug, Serialize)]
pub struct TopBooksAllResponse {
    pub books: Vec<Book>,
    pub count: usize,
    pub genres: Vec<String>,
}

const DEFAULT_TOP_LIMIT: usize = 6;
const DEFAULT_PER_GENRE: usize = 3;

async fn top_books(
    State(state): State<AppState>,
    Query(query): Query<TopBooksQuery>,
) -> Result<axum::response::Response, ApiError> {
    use axum::response::IntoResponse;

    if let Some(per_genre) = query.per_genre {
        let per_genre = if per_genre == 0 {
            DEFAULT_PER_GENRE
        } else {
            per_genre
        };
        let shelves = state
            .recommender
            .top_books_all(per_genre)
            .await
            .map_err(into_api_error)?;
        let genres: Vec<String> = shelves.iter().map(|(genre, _)| genre.clone()).collect();
        let books: Vec<Book> = shelves.into_iter().flat_map(|(_, books)| books).collect();
        let count = books.len();
        return Ok(Json(TopBooksAllResponse {
            books,
            count,
            genres,
        })
        .into_response());
    }

    let genre = query.genre.unwrap_or_else(|| "fiction".to_string());
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, 20);
    let books = state
        .recommender
        .top_books_by_genre(&genre, limit)
        .await
        .map_err(into_api_error)?;
    let count = books.len();
    Ok(Json(TopBooksResponse {
        genre,
        books,
        count,
    })
    .into_response())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreInfo {
    pub id: String,
    pub display_name: String,
    pub curated_count: usize,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<GenreInfo>,
}

async fn genres() -> Json<GenresResponse> {
    let genres = catalog::TOP_BOOKS_BY_GENRE
        .iter()
        .map(|(genre, titles)| GenreInfo {
            id: genre.to_string(),
            display_name: catalog::display_name(genre),
            curated_count: titles.len(),
        })
        .collect();
    Json(GenresResponse { genres })
}

#[derive(Debug, Serialize)]
pub struct GenreRecommendResponse {
    pub genre: String,
    pub recommendations: Vec<Book>,
    pub message: String,
}

async fn recommend_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
) -> Result<Json<GenreRecommendResponse>, ApiError> {
    let books = state
        .recommender
        .recommend_by_genre(&genre, DEFAULT_TOP_LIMIT)
        .await
        .map_err(into_api_error)?;
    let message = format!("{} picks from the {} shelf.", books.len(), genre);
    Ok(Json(GenreRecommendResponse {
        genre,
        recommendations: books,
        message,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub ai_enabled: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        ai_enabled: state.ai_enabled,
    })
}

#[derive(Debug, Serialize)]
pub struct FreeBooksResponse {
    pub books: Vec<Book>,
    pub count: usize,
}

async fn free_books(State(state): State<AppState>) -> Json<FreeBooksResponse> {
    let books = state.aggregator.free_books().await;
    let count = books.len();
    Json(FreeBooksResponse { books, count })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommend", post(recommend))
        .route("/api/top-books", get(top_books))
        .route("/api/genres", get(genres))
        .route("/api/recommend-by-genre/{genre}", get(recommend_by_genre))
        .route("/api/free-books", get(free_books))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the task is cancelled.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
