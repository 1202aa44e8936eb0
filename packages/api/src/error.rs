use amphora_uri::UriError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed uri/url handed to the client. Raised synchronously before
    /// any network call; programmer-facing, never user-facing.
    #[error(transparent)]
    Validation(#[from] UriError),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The response landed on a login flow; the caller should navigate the
    /// whole page there.
    #[error("Authentication redirect to {0}")]
    AuthRedirect(String),

    #[error("HTTP {status} for {url}: {message}")]
    Http {
        status: u16,
        url: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response body from {url}: {message}")]
    InvalidBody { url: String, message: String },
}
