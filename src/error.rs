#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to fetch {url}. Status code: {status}")]
    Status { status: u16, url: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Invalid header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
