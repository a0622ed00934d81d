//! Error type shared by the client and the dispatcher.

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or non-2xx status.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a body that did not decode.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured URL could not be parsed.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A configured URL cannot carry path segments (e.g. `mailto:`).
    #[error("url cannot be used as a base: {0}")]
    BaseUrl(String),
}
