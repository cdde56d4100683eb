use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scheduling API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Time slot '{id}' not found")]
    SlotNotFound { id: String },

    #[error("Invalid slot hour '{0}'")]
    InvalidHour(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SchedResult<T> = Result<T, SchedError>;
