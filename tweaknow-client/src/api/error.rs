use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Map a non-success status and its body onto an error variant
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => ApiError::NotFound(body),
            401 | 403 => ApiError::Unauthorized(body),
            400 | 422 => ApiError::BadRequest(body),
            _ => ApiError::Api { status, message: body },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
