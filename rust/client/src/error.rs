use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to gymnasium server failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed server response: {0}")]
    Malformed(String),

    #[error("unsupported space: {0}")]
    UnsupportedSpace(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
