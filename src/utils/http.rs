//! HTTP plumbing shared by the backend clients.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::config::HttpConfig;
use crate::error::{Result, ServiceError};
use crate::router::BackendId;

/// Build the shared `reqwest::Client` from [`HttpConfig`].
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(proxy_url) = &config.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ServiceError::Configuration(format!("Invalid proxy URL: {e}")))?;
        builder = builder.proxy(proxy);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    builder
        .build()
        .map_err(|e| ServiceError::Configuration(format!("Failed to create HTTP client: {e}")))
}

/// HTTP header builder for backend requests
#[derive(Debug, Default)]
pub struct HttpHeaderBuilder {
    headers: HeaderMap,
}

impl HttpHeaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add Bearer token authorization
    pub fn with_bearer_auth(mut self, token: &str) -> Result<Self> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| ServiceError::Configuration(format!("Invalid API key format: {e}")))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Add JSON content type
    pub fn with_json_content_type(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Add a custom header
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ServiceError::Configuration(format!("Invalid header name '{name}': {e}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| {
            ServiceError::Configuration(format!("Invalid header value for '{name}': {e}"))
        })?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Add a custom header when a value is present
    pub fn with_optional_header(self, name: &str, value: Option<&str>) -> Result<Self> {
        match value {
            Some(v) if !v.trim().is_empty() => self.with_header(name, v.trim()),
            _ => Ok(self),
        }
    }

    pub fn build(self) -> HeaderMap {
        self.headers
    }
}

/// Map a transport failure to a provider error.
pub fn transport_error(backend: BackendId, error: reqwest::Error) -> ServiceError {
    let message = if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection failed: {error}")
    } else {
        error.to_string()
    };
    tracing::warn!("{} transport error: {}", backend, message);
    ServiceError::provider(backend, error.status().map(|s| s.as_u16()), message)
}

/// Turn a non-success response into a provider error carrying its status.
pub async fn response_error(backend: BackendId, response: reqwest::Response) -> ServiceError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let detail = error_message_from_body(&body).unwrap_or(body);

    let message = match status.as_u16() {
        400 => format!("Bad request: {detail}"),
        401 => format!("Invalid API key: {detail}"),
        403 => format!("Forbidden: {detail}"),
        404 => format!("Not found: {detail}"),
        429 => format!("Rate limit exceeded: {detail}"),
        _ => format!("API error {status}: {detail}"),
    };
    tracing::warn!("{} returned {}: {}", backend, status, detail);
    ServiceError::provider(backend, Some(status.as_u16()), message)
}

/// Pull a human-readable message out of the usual JSON error envelopes.
///
/// OpenAI-style bodies use `{"error":{"message":..}}`, Replicate uses
/// `{"detail":..}`.
fn error_message_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value
        .pointer("/error/message")
        .or_else(|| value.get("error"))
        .or_else(|| value.get("detail"))
        .or_else(|| value.get("message"))?;
    message.as_str().map(str::to_string)
}
