use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog API error: {0}")]
    Upstream(String),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Catalog call panicked: {0}")]
    Panicked(String),

    #[error("Feed orchestration failed: {0}")]
    Orchestration(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
