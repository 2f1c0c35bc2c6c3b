//! HTTP transport: issues JSON (and binary) requests against the API base
//! URL and normalizes every failure into a [`TransportError`].

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};

/// Per-request options: method, JSON body, extra headers.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// Non-JSON content (e.g. `application/pdf`), returned untouched.
    Binary(Vec<u8>),
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub payload: Payload,
}

impl ApiResponse {
    /// Take the JSON body, failing if the server sent binary content.
    pub fn into_json(self) -> Result<Value, TransportError> {
        match self.payload {
            Payload::Json(value) => Ok(value),
            Payload::Binary(bytes) => Err(TransportError::http(
                self.status,
                format!("Expected JSON but received {} bytes of binary content", bytes.len()),
            )),
        }
    }
}

/// Thin request/response layer over `reqwest`.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Issue a request against `path` (relative to the base URL).
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        let result = self.send(path, options).await;
        if let Err(ref e) = result {
            tracing::debug!(path, status = ?e.status, "API error: {}", e.message);
        }
        result
    }

    async fn send(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, TransportError> {
        let mut builder = self
            .client
            .request(options.method, self.url(path))
            .header(CONTENT_TYPE, "application/json");

        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::network(format!("Request to {path} failed: {e}")))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            TransportError::http(status.as_u16(), format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(TransportError::http(
                status.as_u16(),
                error_message(status, &bytes),
            ));
        }

        if content_type.as_deref().is_some_and(is_binary_content_type) {
            return Ok(ApiResponse {
                status: status.as_u16(),
                payload: Payload::Binary(bytes.to_vec()),
            });
        }

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| {
                TransportError::http(status.as_u16(), format!("Invalid JSON in response: {e}"))
            })?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            payload: Payload::Json(value),
        })
    }
}

/// Whether a content type denotes a non-JSON payload that must not be parsed.
pub fn is_binary_content_type(content_type: &str) -> bool {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    !(media.is_empty() || media.contains("json") || media.starts_with("text/"))
}

/// Message for a non-2xx response: the server's `message` or `error` field
/// when the body is JSON carrying one, else `HTTP <code>: <reason>`.
pub fn error_message(status: StatusCode, body: &[u8]) -> String {
    let from_body = serde_json::from_slice::<Value>(body).ok().and_then(|json| {
        ["message", "error"].iter().find_map(|key| {
            json.get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
    });

    from_body.unwrap_or_else(|| {
        format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        )
    })
}
