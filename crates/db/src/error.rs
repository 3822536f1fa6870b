use tandem_core::types::DbId;

/// Failure of a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store could not be reached or refused the write.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },
}

pub type StoreResult<T> = Result<T, StoreError>;
