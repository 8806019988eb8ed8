//! # auth0-client
//!
//! A thin JSON client for the Auth0 authentication and management APIs, built
//! on [`reqwest`].
//!
//! This crate provides:
//!  - A [`Client`] configured once from [`ClientOptions`]
//!  - URL building against the tenant's base url, with optional query and
//!    `auth0Client` telemetry parameters
//!  - Bearer authentication and the `Auth0-Client` telemetry header on every
//!    request
//!  - Response decoding into [`ResponseBody::Json`], falling back to
//!    [`ResponseBody::Text`]
//!  - A [`Fetch`] seam for swapping out the transport
//!
//! HTTP error statuses are returned as regular [`ApiResponse`]s. Only timeouts
//! and transport failures are errors.
//!
//! ## Example
//! ```rust,no_run
//! use auth0_client::{Client, ClientOptions};
//! use color_eyre::Result;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::new(
//!         ClientOptions::builder()
//!             .base_url("samples.auth0.com")
//!             .token("my_management_api_token".to_owned())
//!             .timeout(Duration::from_secs(5))
//!             .build(),
//!     )?;
//!
//!     let response = client.get("/api/v2/users", &[("page", "0")]).await?;
//!     println!("{} {:?}", response.status, response.json());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
pub mod fetch;
mod options;
mod response;
pub mod telemetry;

pub use client::Client;
pub use error::{Error, Result};
pub use fetch::{Fetch, FetchRequest, RawResponse, ReqwestFetcher};
pub use options::{ClientOptions, DEFAULT_TIMEOUT};
pub use response::{ApiResponse, ResponseBody};
pub use telemetry::{Telemetry, TelemetryDefaults, TelemetryOptions};
