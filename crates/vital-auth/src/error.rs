use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP transport error.
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Token endpoint returned a non-success status code.
    #[error("token endpoint error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not contain the expected fields.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    #[error("token expired at {0}")]
    TokenExpired(chrono::DateTime<chrono::Utc>),

    #[error("{0}")]
    Other(String),
}
