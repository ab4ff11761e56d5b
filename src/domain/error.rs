use thiserror::Error;

/// Failure modes every operation can report to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// No session, expired session, or (under a distinguishing ownership
    /// policy) an entity owned by someone else.
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A move could not complete without leaving siblings with duplicate
    /// or gapped positions; the transaction was rolled back.
    #[error("reorder conflict")]
    ConflictOnReorder,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Internal(anyhow::Error::new(e))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
