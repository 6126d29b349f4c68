use thiserror::Error;

/// The crate's error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The auth token was rejected by the backend as expired or missing.
    #[error("Authentication token is no longer valid")]
    NotAuthenticated,

    /// A stash restore was requested but no complete stash exists.
    #[error("No stashed session available")]
    NoStashedSession,

    /// The backend resolved with a non-success jsonCode.
    #[error("API error {code}: {message}")]
    Api {
        /// The jsonCode carried by the response.
        code: i64,
        /// The backend-provided message, if any.
        message: String,
    },

    /// A serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `SessionError` as the error type.
pub type Result<T> = std::result::Result<T, SessionError>;
