use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of [`ApiError`], useful when callers only care
/// about where a failure came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure, timeout or a non-success HTTP status.
    Transport,
    /// A local attachment could not be read. No request was sent.
    FileNotReadable,
    /// The server answered 2xx but the body was not valid JSON.
    Decode,
    /// The call could not be built (missing default id, bad payload, bad URL).
    Usage,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Access denied: {message}")]
    Forbidden { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Rate limit exceeded. Retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Unexpected status: {status} - {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Response with status {status} is not valid JSON: {body}")]
    Decode { status: u16, body: String },

    #[error("Unable to open {} for reading: {source}", path.display())]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No {field} id given and no default {field} configured")]
    MissingContext { field: &'static str },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::RequestFailed(_)
            | ApiError::Timeout { .. }
            | ApiError::AuthenticationFailed { .. }
            | ApiError::Forbidden { .. }
            | ApiError::NotFound { .. }
            | ApiError::BadRequest { .. }
            | ApiError::RateLimited { .. }
            | ApiError::ServerError { .. }
            | ApiError::UnexpectedStatus { .. } => ErrorKind::Transport,
            ApiError::FileNotReadable { .. } => ErrorKind::FileNotReadable,
            ApiError::Decode { .. } => ErrorKind::Decode,
            ApiError::MissingContext { .. }
            | ApiError::InvalidPayload(_)
            | ApiError::InvalidUrl(_)
            | ApiError::JsonError(_) => ErrorKind::Usage,
        }
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ApiError::AuthenticationFailed { .. } => {
                Some("Check the API key, or set ASANA_API_KEY for this profile")
            }
            ApiError::Forbidden { .. } => {
                Some("The API key owner has no access to this resource")
            }
            ApiError::NotFound { .. } => Some("Check if the resource ID is correct"),
            ApiError::BadRequest { .. } => Some("Review the request parameters"),
            ApiError::RateLimited { .. } => Some("Wait before sending more requests"),
            ApiError::Timeout { .. } => {
                Some("Check your network connection or raise timeout_secs in the profile")
            }
            ApiError::MissingContext { .. } => {
                Some("Pass the id explicitly or set workspace_id/project_id in the profile")
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
