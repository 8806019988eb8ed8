//! The `Auth0-Client` telemetry descriptor.
//!
//! Every request identifies the calling library through a small JSON document,
//! base64 encoded, sent as the `Auth0-Client` header and optionally as the
//! `auth0Client` query parameter.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

/// Name and version reported when the caller does not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryDefaults {
    pub name: String,
    pub version: String,
}

impl Default for TelemetryDefaults {
    /// This crate's own package name and version.
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

/// Caller supplied overrides. Missing fields fall back to [`TelemetryDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, bon::Builder)]
#[serde(default)]
pub struct TelemetryOptions {
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub version: Option<String>,
}

/// The descriptor that gets serialized and sent with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub name: String,
    pub version: String,
    /// Set when the caller wraps this client under its own name. Maps the
    /// default library name to the default version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
}

impl Telemetry {
    pub fn new(options: Option<&TelemetryOptions>, defaults: &TelemetryDefaults) -> Self {
        let name = options
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| defaults.name.clone());
        let version = options
            .and_then(|o| o.version.clone())
            .unwrap_or_else(|| defaults.version.clone());

        let env = (name != defaults.name).then(|| {
            BTreeMap::from([(defaults.name.clone(), defaults.version.clone())])
        });

        Self { name, version, env }
    }

    /// JSON, then standard padded base64.
    pub fn encode(&self) -> String {
        let mut doc = json!({ "name": self.name, "version": self.version });
        if let Some(env) = &self.env {
            doc["env"] = json!(env);
        }
        base64::engine::general_purpose::STANDARD.encode(doc.to_string())
    }
}
