use crate::{
    error::{Error, Result},
    fetch::{Fetch, FetchRequest, ReqwestFetcher},
    options::{ClientOptions, DEFAULT_TIMEOUT},
    response::ApiResponse,
    telemetry::Telemetry,
};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use std::{fmt, sync::Arc, time::Duration, time::Instant};
use tracing::{debug, error, field, info_span, warn, Instrument as _};

const AUTH0_CLIENT_HEADER: HeaderName = HeaderName::from_static("auth0-client");
const AUTH0_CLIENT_QUERY: &str = "auth0Client";

/// Client for a single Auth0 tenant.
///
/// Configuration is fixed at construction. Cloning is cheap and clones share
/// the same configuration and transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    /// Normalized base url as given, always with an http(s) scheme.
    base_url: String,
    domain: String,
    /// Full `Authorization` value. Checked against header rules per request.
    bearer: Option<SecretString>,
    timeout: Duration,
    telemetry: Telemetry,
    fetcher: Arc<dyn Fetch>,
}

impl Client {
    /// Creates a client that talks HTTP through [`ReqwestFetcher`].
    pub fn new(options: ClientOptions) -> Result<Self> {
        Self::with_fetcher(options, Arc::new(ReqwestFetcher::new()?))
    }

    pub fn with_fetcher(options: ClientOptions, fetcher: Arc<dyn Fetch>) -> Result<Self> {
        let raw = match options.base_url {
            Some(url) if !url.is_empty() => url,
            _ => return Err(Error::MissingBaseUrl),
        };

        let parsed = Url::parse(&raw).ok();
        let has_scheme = parsed
            .as_ref()
            .is_some_and(|u| matches!(u.scheme(), "http" | "https"));
        let domain = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map_or_else(|| raw.clone(), str::to_owned);
        let base_url = if has_scheme { raw } else { format!("https://{raw}") };

        let bearer = options
            .token
            .filter(|token| !token.expose_secret().is_empty())
            .map(|token| SecretString::new(format!("Bearer {}", token.expose_secret())));

        let telemetry =
            Telemetry::new(options.telemetry.as_ref(), &options.telemetry_defaults);

        Ok(Self {
            inner: Arc::new(Inner {
                base_url,
                domain,
                bearer,
                timeout: options.timeout.unwrap_or(DEFAULT_TIMEOUT),
                telemetry,
                fetcher,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Hostname of the base url, or the base url as given when it has none.
    pub fn domain(&self) -> &str {
        &self.inner.domain
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.inner.telemetry
    }

    pub fn has_token(&self) -> bool {
        self.inner.bearer.is_some()
    }

    /// Value of the `Auth0-Client` header and `auth0Client` query parameter.
    pub fn encoded_telemetry(&self) -> String {
        self.inner.telemetry.encode()
    }

    /// Resolves `path` against the base url.
    ///
    /// `query` pairs are appended to the query string in order, after any
    /// query already present in `path`. With `include_telemetry` the encoded
    /// telemetry is appended as `auth0Client`. When `query` is empty and
    /// telemetry is not requested the resolved url is returned as is.
    ///
    /// Fails with [`Error::InvalidUrl`] when the base url and `path` do not
    /// form a valid url.
    pub fn url(
        &self,
        path: &str,
        query: &[(&str, &str)],
        include_telemetry: bool,
    ) -> Result<Url> {
        let mut url = Url::parse(&self.inner.base_url)
            .and_then(|base| base.join(path))
            .map_err(|source| Error::InvalidUrl {
                path: path.to_owned(),
                source,
            })?;

        if !query.is_empty() || include_telemetry {
            let telemetry = include_telemetry.then(|| self.encoded_telemetry());
            let mut pairs = url.query_pairs_mut();
            pairs.extend_pairs(query);
            if let Some(telemetry) = telemetry {
                pairs.append_pair(AUTH0_CLIENT_QUERY, &telemetry);
            }
        }

        Ok(url)
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ApiResponse> {
        let url = self.url(path, query, false)?;
        self.request::<()>(Method::GET, url, None).await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path, &[], false)?;
        self.request(Method::POST, url, Some(body)).await
    }

    pub async fn patch<B>(&self, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path, &[], false)?;
        self.request(Method::PATCH, url, Some(body)).await
    }

    /// Sends a JSON request and decodes the response.
    ///
    /// The body is decoded as JSON if possible, otherwise kept as text, and
    /// replaced by the status text if it could not be read. Non-2xx statuses
    /// are responses, not errors. Errors are a token that is not a valid
    /// header value, an unserializable body, timeouts and transport failures.
    pub async fn request<B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let span = info_span!(
            "http.request",
            http.method = %method,
            http.url = %sanitize_url(&url),
            http.status_code = field::Empty,
            http.duration_ms = field::Empty,
        );

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            AUTH0_CLIENT_HEADER,
            HeaderValue::try_from(self.encoded_telemetry())
                .expect("base64 output is a valid header value"),
        );
        if let Some(bearer) = &self.inner.bearer {
            let mut value =
                HeaderValue::from_str(bearer.expose_secret()).map_err(Error::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(Error::SerializeBody)?;

        let request = FetchRequest {
            method,
            url,
            headers,
            body,
        };

        async move {
            let start = Instant::now();
            let result = self.inner.fetcher.fetch(request, self.inner.timeout).await;
            let span = tracing::Span::current();
            span.record("http.duration_ms", field::display(start.elapsed().as_millis()));

            let raw = match result {
                Ok(raw) => raw,
                Err(e) => {
                    error!(error = %e, "HTTP request failed");
                    return Err(e);
                }
            };

            span.record("http.status_code", field::display(raw.status.as_u16()));
            if raw.status.is_success() {
                debug!(status = %raw.status, "HTTP request succeeded");
            } else {
                warn!(status = %raw.status, "HTTP request did not succeed");
            }

            Ok(ApiResponse::decode(raw))
        }
        .instrument(span)
        .await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url)
            .field("domain", &self.inner.domain)
            .field("has_token", &self.has_token())
            .field("timeout", &self.inner.timeout)
            .field("telemetry", &self.inner.telemetry)
            .finish_non_exhaustive()
    }
}

/// Strips userinfo and query so neither credentials nor the telemetry blob
/// end up in logs.
fn sanitize_url(url: &Url) -> Url {
    let mut cloned = url.clone();
    let _ = cloned.set_username("");
    let _ = cloned.set_password(None);
    cloned.set_query(None);
    cloned
}
