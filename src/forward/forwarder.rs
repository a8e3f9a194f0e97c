//! Single-attempt upstream request execution.
//!
//! # Responsibilities
//! - Rewrite the target URL (base + upstream path + inbound query)
//! - Apply the header forwarding policy
//! - Enforce the per-call deadline
//! - Classify the result into an `Outcome`
//!
//! # Design Decisions
//! - Only `Content-Type` and `Authorization` are forwarded from the
//!   client; `User-Agent` and `Accept` are always the gateway's own
//! - A repeated query key keeps its first value when the outgoing URL is
//!   built; later repetitions are dropped
//! - Connection reuse is whatever the shared `reqwest::Client` pool gives

use std::collections::HashSet;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use url::Url;

use crate::forward::outcome::{Outcome, Payload};

/// Gateway identification sent upstream on every call.
pub const GATEWAY_USER_AGENT: &str =
    concat!("unified-gateway/", env!("CARGO_PKG_VERSION"));

/// One inbound call, reduced to what forwarding needs. Transient.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    /// Query pairs in received order, repeated keys preserved as received.
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build from the pieces axum hands a handler.
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            query: parse_query(uri.query().unwrap_or_default()),
            headers,
            body,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// First value for a query key, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Executes one upstream HTTP call under a bounded deadline.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        // No client-level timeout: the deadline is per call so callers with
        // a different budget can share the pool.
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, timeout }
    }

    /// Forward to a registered service: base URL + rewritten path.
    pub async fn forward(
        &self,
        base_url: &Url,
        upstream_path: &str,
        request: &ProxyRequest,
    ) -> Outcome {
        match build_target_url(base_url, upstream_path, &request.query) {
            Ok(url) => self.execute(url, request).await,
            Err(e) => Outcome::ConnectionFailure {
                detail: format!("invalid upstream url: {e}"),
            },
        }
    }

    /// Forward to an absolute URL, bypassing the registry (universal
    /// proxy). Same deadline and header policy.
    pub async fn forward_url(&self, url: Url, request: &ProxyRequest) -> Outcome {
        self.execute(url, request).await
    }

    async fn execute(&self, url: Url, request: &ProxyRequest) -> Outcome {
        tracing::debug!(
            method = %request.method,
            url = %url,
            "Forwarding to upstream"
        );

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .timeout(self.timeout)
            .headers(outgoing_headers(&request.headers));

        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return classify_send_error(&e),
        };

        let status = StatusCode::from_u16(response.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let headers = response.headers().clone();
        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return classify_send_error(&e),
        };

        let body = if text.is_empty() {
            Payload::Empty
        } else if is_json {
            match serde_json::from_str(&text) {
                Ok(value) => Payload::Json(value),
                Err(_) => return Outcome::DecodeFailure { status, raw: text },
            }
        } else {
            Payload::Text(text)
        };

        if status.is_success() {
            Outcome::Success {
                status,
                headers,
                body,
            }
        } else {
            Outcome::UpstreamStatus { status, body }
        }
    }
}

fn classify_send_error(e: &reqwest::Error) -> Outcome {
    if e.is_timeout() {
        Outcome::Timeout
    } else {
        Outcome::ConnectionFailure {
            detail: root_cause(e),
        }
    }
}

/// Shortest useful description of a transport error, without the wrapped
/// chain reqwest prints by default.
fn root_cause(e: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = e;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}

/// Build the outgoing URL: base + rewritten path, inbound query appended in
/// received order with first-value-wins on repeated keys.
pub fn build_target_url(
    base_url: &Url,
    upstream_path: &str,
    query: &[(String, String)],
) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&format!(
        "{}{}",
        base_url.as_str().trim_end_matches('/'),
        upstream_path
    ))?;

    if !query.is_empty() {
        let mut seen = HashSet::new();
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            if seen.insert(key.as_str()) {
                pairs.append_pair(key, value);
            }
        }
    }
    Ok(url)
}

/// Headers for the upstream call: selected inbound headers plus the
/// gateway's fixed identity, which overrides anything client-supplied.
fn outgoing_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [header::CONTENT_TYPE, header::AUTHORIZATION] {
        if let Some(value) = inbound.get(&name) {
            headers.insert(name, value.clone());
        }
    }
    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_static(GATEWAY_USER_AGENT),
    );
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:5000").unwrap()
    }

    #[test]
    fn test_target_url_joins_base_and_path() {
        let url = build_target_url(&base(), "/api/check", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/check");
    }

    #[test]
    fn test_target_url_with_base_path_prefix() {
        let base = Url::parse("http://127.0.0.1:5000/v1/").unwrap();
        let url = build_target_url(&base, "/api/check", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/v1/api/check");
    }

    #[test]
    fn test_query_appended_in_order() {
        let query = vec![
            ("query".to_string(), "a@b.com".to_string()),
            ("limit".to_string(), "5".to_string()),
        ];
        let url = build_target_url(&base(), "/api/check", &query).unwrap();
        assert_eq!(url.query(), Some("query=a%40b.com&limit=5"));
    }

    #[test]
    fn test_repeated_query_key_first_value_wins() {
        let query = vec![
            ("query".to_string(), "first".to_string()),
            ("query".to_string(), "second".to_string()),
        ];
        let url = build_target_url(&base(), "/api/check", &query).unwrap();
        assert_eq!(url.query(), Some("query=first"));
    }

    #[test]
    fn test_empty_query_adds_no_separator() {
        let url = build_target_url(&base(), "/api/health", &[]).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_outgoing_headers_policy() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());
        inbound.insert(header::AUTHORIZATION, "Bearer tok".parse().unwrap());
        inbound.insert(header::USER_AGENT, "curl/8.0".parse().unwrap());
        inbound.insert("x-custom", "dropped".parse().unwrap());

        let headers = outgoing_headers(&inbound);
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok");
        assert_eq!(headers.get(header::USER_AGENT).unwrap(), GATEWAY_USER_AGENT);
        assert_eq!(headers.get(header::ACCEPT).unwrap(), "application/json");
        assert!(headers.get("x-custom").is_none());
    }

    #[test]
    fn test_proxy_request_query_parsing() {
        let uri: Uri = "/api/check?query=test%40example.com&query=other"
            .parse()
            .unwrap();
        let request =
            ProxyRequest::from_parts(Method::GET, &uri, HeaderMap::new(), Bytes::new());
        assert_eq!(
            request.query,
            vec![
                ("query".to_string(), "test@example.com".to_string()),
                ("query".to_string(), "other".to_string()),
            ]
        );
        assert_eq!(request.query_value("query"), Some("test@example.com"));
    }
}
