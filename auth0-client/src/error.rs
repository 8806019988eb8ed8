use std::time::Duration;
use thiserror::Error;

/// Errors produced by [`crate::Client`].
///
/// HTTP error statuses are not errors: they come back as a normal
/// [`crate::ApiResponse`] with `ok == false`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("missing Auth0 domain")]
    MissingBaseUrl,
    #[error("failed to resolve `{path}` against the base url")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("token cannot be used in an Authorization header")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),
    #[error("failed to serialize request body")]
    SerializeBody(#[source] serde_json::Error),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
