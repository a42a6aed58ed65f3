//! HTTP client wrapper for the FlipperHTTP device API.
//!
//! Every operation is a single outbound request. Failures of any kind
//! (transport, non-2xx status, bad JSON) are folded into the uniform
//! `{"status": "error", "message": ...}` value so callers always get a
//! JSON response to print or forward. No retries.

use std::time::Duration;

use serde_json::{Value, json};

use crate::config::FlipperConfig;
use crate::error::{Error, Result};

/// Client for the remote FlipperHTTP REST API.
pub struct FlipperClient {
    http: reqwest::Client,
    base_url: String,
}

impl FlipperClient {
    /// Create a client from the configured device URL and timeout.
    pub fn new(config: &FlipperConfig) -> Result<Self> {
        Self::with_timeout(&config.flipper_url, config.timeout())
    }

    /// Create a client with an explicit base URL and timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Test connectivity with the device health endpoint.
    pub async fn connect(&self) -> bool {
        match self.http.get(self.url("/api/health")).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!("connection failed: {e}");
                false
            }
        }
    }

    /// Start the device-side HTTP proxy on the given port.
    pub async fn start_proxy(&self, port: u16) -> Value {
        let request = self
            .http
            .post(self.url("/api/proxy/start"))
            .json(&json!({ "port": port }));
        self.passthrough(request, "failed to start proxy").await
    }

    /// Stop the device-side HTTP proxy.
    pub async fn stop_proxy(&self) -> Value {
        let request = self.http.post(self.url("/api/proxy/stop"));
        self.passthrough(request, "failed to stop proxy").await
    }

    /// Get the current proxy status.
    pub async fn proxy_status(&self) -> Value {
        let request = self.http.get(self.url("/api/proxy/status"));
        self.passthrough(request, "failed to get proxy status").await
    }

    /// Get the most recent intercepted requests, up to `limit`.
    pub async fn intercepted_requests(&self, limit: u32) -> Value {
        let request = self
            .http
            .get(self.url("/api/requests"))
            .query(&[("limit", limit)]);
        self.passthrough(request, "failed to get requests").await
    }

    /// Forward an intercepted request, optionally with a modified body.
    pub async fn forward_request(&self, request_id: &str, modified_body: Option<&str>) -> Value {
        let mut payload = json!({ "request_id": request_id });
        if let Some(body) = modified_body {
            payload["body"] = json!(body);
        }
        let request = self
            .http
            .post(self.url("/api/requests/forward"))
            .json(&payload);
        self.passthrough(request, "failed to forward request").await
    }

    /// Get device system information.
    pub async fn system_info(&self) -> Value {
        let request = self.http.get(self.url("/api/system/info"));
        self.passthrough(request, "failed to get system info").await
    }

    /// Set proxy filtering and forwarding rules.
    pub async fn set_proxy_rules(&self, rules: &Value) -> Value {
        let request = self.http.post(self.url("/api/proxy/rules")).json(rules);
        self.passthrough(request, "failed to set proxy rules").await
    }

    /// Run a request and fold any failure into the uniform error value.
    async fn passthrough(&self, request: reqwest::RequestBuilder, context: &str) -> Value {
        match self.execute(request).await {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("{context}: {e}");
                error_value(&e)
            }
        }
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::http(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::http(e.to_string()))?;
        response
            .json()
            .await
            .map_err(|e| Error::http(format!("invalid JSON response: {e}")))
    }
}

/// The uniform error value returned for any failed device call.
pub fn error_value(err: &Error) -> Value {
    json!({ "status": "error", "message": err.to_string() })
}

/// Whether a device response reports success.
pub fn is_success(value: &Value) -> bool {
    value.get("status").and_then(Value::as_str) == Some("success")
}

/// The `message` field of a device response, if any.
pub fn message_of(value: &Value) -> &str {
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(url: &str) -> FlipperClient {
        FlipperClient::with_timeout(url, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_client_construction_from_config() {
        let config = FlipperConfig::default();
        let client = FlipperClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = test_client("http://flipper.local:8080/");
        assert_eq!(client.base_url(), "http://flipper.local:8080");
        assert_eq!(
            client.url("/api/health"),
            "http://flipper.local:8080/api/health"
        );
    }

    #[test]
    fn test_error_value_shape() {
        let err = Error::http("connection refused");
        let value = error_value(&err);
        assert_eq!(value["status"], "error");
        assert!(value["message"].as_str().unwrap().contains("refused"));
    }

    #[test]
    fn test_is_success() {
        assert!(is_success(&json!({ "status": "success" })));
        assert!(!is_success(&json!({ "status": "error" })));
        assert!(!is_success(&json!({})));
    }

    #[test]
    fn test_message_of() {
        assert_eq!(message_of(&json!({ "message": "boom" })), "boom");
        assert_eq!(message_of(&json!({})), "unknown error");
    }

    /// Bind and drop a listener to get a local port with nothing on it.
    fn unused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_connect_unreachable_device() {
        let client = test_client(&format!("http://127.0.0.1:{}", unused_port()));
        assert!(!client.connect().await);
    }

    #[tokio::test]
    async fn test_passthrough_unreachable_device_error_shape() {
        let client = test_client(&format!("http://127.0.0.1:{}", unused_port()));

        let status = client.proxy_status().await;
        assert_eq!(status["status"], "error");
        assert!(status["message"].is_string());

        let started = client.start_proxy(8888).await;
        assert_eq!(started["status"], "error");

        let forwarded = client.forward_request("req-1", Some("body")).await;
        assert_eq!(forwarded["status"], "error");
    }
}
