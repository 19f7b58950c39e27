use thiserror::Error;

#[derive(Error, Debug)]
pub enum SandError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
