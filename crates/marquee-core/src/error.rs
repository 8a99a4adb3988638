use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required element not found: {0}")]
    MissingElement(String),

    #[error("Invalid href: {0}")]
    InvalidHref(String),
}

pub type Result<T> = std::result::Result<T, Error>;
