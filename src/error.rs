use thiserror::Error;

/// Failure to read the transcriptions table, whatever the backend.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode rows: {0}")]
    Decode(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(value: reqwest::Error) -> Self {
        Self::Request(value.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<rusqlite::Error> for FetchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Database(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read settings at {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid settings file {path}: {message}")]
    Parse { path: String, message: String },
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("unknown timezone: {0}")]
    Timezone(String),
}

pub type FetchResult<T> = Result<T, FetchError>;
