//! The transport seam.
//!
//! [`crate::Client`] builds a [`FetchRequest`] and hands it to a [`Fetch`]
//! implementation together with its timeout. The default implementation,
//! [`ReqwestFetcher`], sends it with [`reqwest`].

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode, Url};
use std::{fmt, time::Duration};

/// Error type for a body that could not be read.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A fully prepared request.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// What came back from the server.
///
/// A failure to read the body is kept in `body` instead of failing the fetch:
/// the client falls back to `status_text` in that case.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Result<Bytes, BoxError>,
}

/// Sends a request, giving up after `timeout`.
///
/// Timeouts and transport failures are returned as errors. HTTP error statuses
/// are not.
#[async_trait]
pub trait Fetch: Send + Sync + fmt::Debug {
    async fn fetch(&self, request: FetchRequest, timeout: Duration) -> Result<RawResponse>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::from_client(client))
    }

    /// Wraps an already configured client, e.g. one with custom TLS roots.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for ReqwestFetcher {
    async fn fetch(&self, request: FetchRequest, timeout: Duration) -> Result<RawResponse> {
        let mut rb = self
            .client
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(timeout);
        if let Some(body) = request.body {
            rb = rb.body(body);
        }

        let response = rb.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout(timeout)
            } else {
                Error::Transport(e)
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body: Result<Bytes, BoxError> = response.bytes().await.map_err(Into::into);

        Ok(RawResponse {
            status,
            status_text: status_text(status),
            headers,
            body,
        })
    }
}

/// reqwest does not expose the reason phrase sent by the server, so this is
/// the canonical one for the code, or empty for unknown codes.
pub fn status_text(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_owned()
}
