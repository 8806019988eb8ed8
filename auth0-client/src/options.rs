use crate::telemetry::{TelemetryDefaults, TelemetryOptions};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Everything needed to construct a [`crate::Client`].
///
/// Can be built in code through [`ClientOptions::builder`] or deserialized
/// from the embedding application's configuration, where the timeout is given
/// in milliseconds as `timeout_ms`.
#[derive(Debug, Default, Deserialize, bon::Builder)]
#[serde(default)]
pub struct ClientOptions {
    /// Auth0 domain or full base url. `https://` is assumed when no scheme is
    /// given. Construction fails when this is absent or empty.
    #[builder(into)]
    pub base_url: Option<String>,
    #[builder(into)]
    pub token: Option<SecretString>,
    pub telemetry: Option<TelemetryOptions>,
    #[serde(rename = "timeout_ms", deserialize_with = "deserialize_millis")]
    pub timeout: Option<Duration>,
    /// Fallback telemetry name and version.
    #[serde(skip)]
    #[builder(default)]
    pub telemetry_defaults: TelemetryDefaults,
}

fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}
