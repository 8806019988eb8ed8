use crate::fetch::RawResponse;
use reqwest::{header::HeaderMap, StatusCode};
use tracing::debug;

/// Decoded body of an [`ApiResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// The raw body when it was not JSON, or the status text when the body
    /// could not be read at all.
    Text(String),
}

/// Response to any request made through [`crate::Client`].
///
/// Returned for every status code. Check [`ApiResponse::ok`] or
/// [`ApiResponse::status`] before trusting the body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// `true` for 2xx statuses.
    pub ok: bool,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub(crate) fn decode(raw: RawResponse) -> Self {
        let body = match raw.body {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(json) => ResponseBody::Json(json),
                Err(error) => {
                    debug!(%error, "response body is not json, keeping it as text");
                    ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned())
                }
            },
            Err(error) => {
                debug!(%error, "failed to read response body, using status text");
                ResponseBody::Text(raw.status_text)
            }
        };

        Self {
            status: raw.status,
            ok: raw.status.is_success(),
            headers: raw.headers,
            body,
        }
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.body {
            ResponseBody::Json(json) => Some(json),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }
}
