// src/error.rs
use thiserror::Error;

/// Failures surfaced by the remote API gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// No response arrived: connection refused, reset, or the request timed out.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a well-formed error response.
    #[error("{message}")]
    Api { code: String, message: String },

    /// A successful response whose body could not be parsed.
    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    pub fn api(code: impl Into<String>, message: impl Into<String>) -> Self {
        GatewayError::Api {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if err.is_timeout() {
            GatewayError::Network(format!("request timed out: {}", err))
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Client-side checks that block a dispatch before any request is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{0} must not be blank")]
    BlankField(&'static str),

    #[error("scenario versions require a base_version_id")]
    MissingBaseVersion,

    #[error("base version {0} is not a known base version")]
    UnknownBaseVersion(String),

    #[error("contract {id}: available limit {available} must be within 0..={total}")]
    LimitOutOfRange { id: String, available: f64, total: f64 },

    #[error("import file {0} is empty")]
    EmptyImport(String),
}
