//! Proxy metadata injection.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// Reserved top-level key the gateway owns in every proxied JSON object.
pub const METADATA_KEY: &str = "_proxy";

/// What the gateway stamps onto proxied JSON object responses.
#[derive(Debug, Clone)]
pub struct ProxyMetadata {
    pub service: String,
    pub upstream_url: Option<String>,
}

impl ProxyMetadata {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            upstream_url: None,
        }
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = Some(url.into());
        self
    }

    fn to_value(&self) -> Value {
        let mut value = json!({
            "secured": true,
            "service": self.service,
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        });
        if let Some(url) = &self.upstream_url {
            value["upstream_url"] = json!(url);
        }
        value
    }
}

/// Insert the `_proxy` key into a JSON object body. The gateway's value
/// always replaces an upstream key of the same name: clients rely on this
/// key and upstream must not be able to spoof it. Non-object values are
/// left untouched.
pub fn inject_metadata(value: &mut Value, meta: &ProxyMetadata) {
    if let Value::Object(map) = value {
        map.insert(METADATA_KEY.to_string(), meta.to_value());
    }
}
