use thiserror::Error;

/// Failures from a single remote fetch call. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Missing field in response: {0}")]
    MissingField(String),

    #[error("Unexpected shape for field '{field}': {message}")]
    Shape { field: String, message: String },
}

impl FetchError {
    /// Short machine-readable code, mirrors the API error codes
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::InvalidUrl(_) => "INVALID_URL",
            FetchError::Timeout(_) => "TIMEOUT",
            FetchError::Transport(_) => "TRANSPORT",
            FetchError::Status { .. } => "UPSTREAM_STATUS",
            FetchError::Decode(_) => "DECODE",
            FetchError::MissingField(_) => "MISSING_FIELD",
            FetchError::Shape { .. } => "SHAPE",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err.to_string())
        } else if err.is_decode() {
            FetchError::Shape {
                field: "<body>".to_string(),
                message: err.to_string(),
            }
        } else {
            FetchError::Transport(err)
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}
