use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database connection error: {0}")]
    Connection(sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Duplicate document id: {0}")]
    Duplicate(String),

    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
            other => StoreError::Connection(other),
        }
    }
}
