use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Session error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
