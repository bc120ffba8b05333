use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Decode(#[from] base64::DecodeError),
}

impl StudioError {
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        StudioError::InvalidResponse(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        StudioError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StudioError>;
