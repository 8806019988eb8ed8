//! Drives [`Client`] through a recording [`Fetch`] so that request shaping and
//! the unreadable-body path can be checked without a server.

use async_trait::async_trait;
use auth0_client::{
    fetch::BoxError, Client, ClientOptions, Fetch, FetchRequest, RawResponse,
    ResponseBody,
};
use bytes::Bytes;
use reqwest::{header::HeaderMap, Method, StatusCode};
use serde_json::json;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

type Respond = Box<dyn Fn() -> RawResponse + Send + Sync>;

struct RecordingFetcher {
    requests: Mutex<Vec<(FetchRequest, Duration)>>,
    respond: Respond,
}

impl std::fmt::Debug for RecordingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingFetcher").finish_non_exhaustive()
    }
}

impl RecordingFetcher {
    fn new(respond: impl Fn() -> RawResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        })
    }

    fn replying(status: StatusCode, body: Result<&'static str, &'static str>) -> Arc<Self> {
        Self::new(move || RawResponse {
            status,
            status_text: auth0_client::fetch::status_text(status),
            headers: HeaderMap::new(),
            body: body
                .map(|s| Bytes::from_static(s.as_bytes()))
                .map_err(BoxError::from),
        })
    }

    fn requests(&self) -> Vec<(FetchRequest, Duration)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetch for RecordingFetcher {
    async fn fetch(
        &self,
        request: FetchRequest,
        timeout: Duration,
    ) -> auth0_client::Result<RawResponse> {
        self.requests.lock().unwrap().push((request, timeout));
        Ok((self.respond)())
    }
}

fn client(fetcher: Arc<RecordingFetcher>, token: Option<&str>) -> Client {
    Client::with_fetcher(
        ClientOptions::builder()
            .base_url("samples.auth0.com")
            .maybe_token(token.map(str::to_owned))
            .build(),
        fetcher,
    )
    .unwrap()
}

#[tokio::test]
async fn test_unreadable_body_uses_status_text() {
    let fetcher = RecordingFetcher::replying(StatusCode::BAD_GATEWAY, Err("reset"));
    let client = client(fetcher.clone(), None);

    let response = client.get("/userinfo", &[]).await.unwrap();

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(!response.ok);
    assert_eq!(response.body, ResponseBody::Text("Bad Gateway".to_owned()));
}

#[tokio::test]
async fn test_default_timeout_is_passed_to_fetch() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("{}"));
    let client = client(fetcher.clone(), None);

    client.get("/userinfo", &[]).await.unwrap();

    let (_, timeout) = &fetcher.requests()[0];
    assert_eq!(*timeout, Duration::from_millis(10_000));
}

#[tokio::test]
async fn test_methods_and_urls() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("{}"));
    let client = client(fetcher.clone(), Some("t"));

    client.get("/api/v2/users", &[("page", "2")]).await.unwrap();
    client.post("/dbconnections/signup", &json!({ "a": 1 })).await.unwrap();
    client.patch("/api/v2/users/42", &json!({ "b": 2 })).await.unwrap();

    let seen: Vec<_> = fetcher
        .requests()
        .into_iter()
        .map(|(r, _)| (r.method, r.url.to_string(), r.body))
        .collect();
    assert_eq!(
        seen,
        [
            (
                Method::GET,
                "https://samples.auth0.com/api/v2/users?page=2".to_owned(),
                None,
            ),
            (
                Method::POST,
                "https://samples.auth0.com/dbconnections/signup".to_owned(),
                Some(br#"{"a":1}"#.to_vec()),
            ),
            (
                Method::PATCH,
                "https://samples.auth0.com/api/v2/users/42".to_owned(),
                Some(br#"{"b":2}"#.to_vec()),
            ),
        ]
    );
}

#[tokio::test]
async fn test_authorization_header_on_every_request() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("{}"));
    let client = client(fetcher.clone(), Some("abc"));

    client.get("/a", &[]).await.unwrap();
    client.post("/b", &json!({})).await.unwrap();

    for (request, _) in fetcher.requests() {
        assert_eq!(request.headers["authorization"], "Bearer abc");
        assert!(request.headers["authorization"].is_sensitive());
        assert_eq!(request.headers["accept"], "application/json");
        assert_eq!(request.headers["content-type"], "application/json");
        assert_eq!(
            request.headers["auth0-client"],
            client.encoded_telemetry().as_str()
        );
    }
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("{}"));
    let client = client(fetcher.clone(), None);

    client.patch("/a", &json!({})).await.unwrap();

    let (request, _) = &fetcher.requests()[0];
    assert!(!request.headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_request_without_body() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("[1,2]"));
    let client = client(fetcher.clone(), None);
    let url = client.url("/authorize", &[], true).unwrap();

    let response = client
        .request::<()>(Method::GET, url.clone(), None)
        .await
        .unwrap();

    assert_eq!(response.json(), Some(&json!([1, 2])));
    let (request, _) = &fetcher.requests()[0];
    assert_eq!(request.url, url);
    assert!(request.body.is_none());
}

#[tokio::test]
async fn test_invalid_token_never_reaches_fetch() {
    let fetcher = RecordingFetcher::replying(StatusCode::OK, Ok("{}"));
    let client = client(fetcher.clone(), Some("bad\ntoken"));

    let err = client.get("/userinfo", &[]).await.unwrap_err();

    assert!(matches!(err, auth0_client::Error::InvalidToken(_)));
    assert!(fetcher.requests().is_empty());
}
