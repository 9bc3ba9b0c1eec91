// src/error.rs
use reqwest::StatusCode;
use thiserror::Error;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failures surfaced by the API gateway and the feature services built on it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// 401 from the backend. The session has already been cleared.
    #[error("not authenticated or session expired, please log in again")]
    Unauthorized,

    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx response whose body reported `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Blocked client-side before any network call.
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        ApiError::Decode {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }
}

/// Reject blank required form fields before they reach the backend.
pub(crate) fn require_non_empty(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
