use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid config '{path}': {reason}")]
    Config { path: String, reason: String },
}

pub type DashResult<T> = Result<T, DashError>;
