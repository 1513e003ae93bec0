use thiserror::Error;

/// Why a fetch produced no series. Terminal for the current refresh cycle only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("record {index}: invalid timestamp '{value}'")]
    InvalidTimestamp { index: usize, value: String },

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::MalformedPayload(err.to_string())
    }
}
