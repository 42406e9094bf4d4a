use thiserror::Error;

/// Typed failures that cross the library boundary. Adapter-level network and
/// parse problems never surface here; they degrade to empty result sets
/// inside the adapters.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Caller supplied unusable input (empty request, unknown genre). The
    /// message is safe to echo back to the client.
    #[error("{0}")]
    InvalidInput(String),

    /// All sources were consulted and nothing usable came back.
    #[error("{0}")]
    NoResults(String),

    /// Anything else: configuration, I/O, serialization.
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
