//! Sensitive-field redaction.
//!
//! Upstream schemas vary by service, so the walk is structural: every
//! object at any depth is inspected, not one known shape.

use serde_json::{json, Value};

/// Replacement written over redacted values.
pub const REDACTION_SENTINEL: &str = "[FILTERED]";

const SENSITIVE_KEYS: [&str; 2] = ["password", "passwords"];

/// Recursively replace the value of every key literally named `password`
/// or `passwords`. Scalars become the sentinel, arrays a one-element
/// sentinel array. Counts like `passwords_found` are not sensitive and
/// stay untouched.
pub fn redact_sensitive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) {
                    *entry = match entry {
                        Value::Array(_) => json!([REDACTION_SENTINEL]),
                        _ => json!(REDACTION_SENTINEL),
                    };
                } else {
                    redact_sensitive(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                redact_sensitive(item);
            }
        }
        _ => {}
    }
}
