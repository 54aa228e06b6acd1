//! Library-internal error types.
//!
//! # Design
//! None of these reach callers of the verb methods: `TransportError` is
//! folded into `ErrorCode::NetworkError` by `ApiService`. `StoreError` and
//! `ConfigError` surface only from credential and configuration operations,
//! where the caller has something to decide.

/// The HTTP exchange did not complete.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection refused, reset, or the host could not be resolved.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    /// The request was never sent: its URL or a header value is malformed.
    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    /// Any other failure while sending the request or reading the body.
    #[error("request failed: {0}")]
    Request(String),

    /// The underlying HTTP client could not be constructed.
    #[error("http client could not be built: {0}")]
    Client(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// A credential store could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

/// Client configuration is missing or malformed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no API base URL configured for the {0} environment")]
    MissingBaseUrl(String),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
