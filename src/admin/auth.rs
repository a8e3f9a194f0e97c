//! Shared-secret verification.
//!
//! # Design Decisions
//! - The credential may arrive as a header, a query parameter, or a JSON
//!   body field; the header is checked first
//! - An empty configured key rejects every admin request rather than
//!   accepting every empty credential

use serde_json::Value;

use crate::forward::ProxyRequest;

/// Header carrying the admin credential.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Query/body parameter carrying the admin credential.
pub const ADMIN_KEY_PARAM: &str = "admin_key";

/// Check the admin shared secret on a request bound for an admin route.
pub fn verify_admin_key(expected: &str, request: &ProxyRequest) -> bool {
    if expected.is_empty() {
        return false;
    }

    if let Some(value) = request
        .headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        return value == expected;
    }

    if let Some(value) = request.query_value(ADMIN_KEY_PARAM) {
        return value == expected;
    }

    if let Ok(body) = serde_json::from_slice::<Value>(&request.body) {
        if let Some(value) = body.get(ADMIN_KEY_PARAM).and_then(Value::as_str) {
            return value == expected;
        }
    }

    false
}
