use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("RAG endpoint returned status {0}")]
    StatusError(reqwest::StatusCode),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

pub type Result<T> = std::result::Result<T, AssistantError>;
