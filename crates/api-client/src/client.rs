//! Main API client implementation

use crate::config::ClientConfig;
use crate::endpoints::{AuthApi, StatsApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Field errors checked first when building a user-facing message, with labels
const PRIORITY_FIELDS: [(&str, &str); 3] = [
    ("email", "Email"),
    ("username", "Username"),
    ("password", "Password"),
];

/// EcoRoute API client
///
/// Thin wrapper over `reqwest` that adds:
/// - Base URL handling and JSON defaults
/// - Optional bearer authentication per request
/// - Request correlation IDs for tracing
/// - Error bodies flattened into a single readable message
#[derive(Clone)]
pub struct EcoRouteClient {
    inner: Client,
    config: Arc<ClientConfig>,
}

impl EcoRouteClient {
    /// Create a new client with configuration from the environment
    pub fn new() -> ApiResult<Self> {
        let config = ClientConfig::from_env()?;
        Self::with_config(config)
    }

    /// Create a new client with specific configuration
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static("ecoroute-api-client/0.3"));

        let inner = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            inner,
            config: Arc::new(config),
        })
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Access login and registration endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access user statistics endpoints
    #[must_use]
    pub fn stats(&self) -> StatsApi {
        StatsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Low-level HTTP methods
    // -------------------------------------------------------------------------

    /// Build the absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Perform a POST request and deserialize the JSON response
    #[instrument(skip(self, body, bearer), fields(request_id))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> ApiResult<T> {
        let response = self.send(Method::POST, path, Some(body), bearer).await?;
        response.json().await.map_err(ApiError::Request)
    }

    /// Perform a POST request, discarding any response body
    #[instrument(skip(self, body, bearer), fields(request_id))]
    pub async fn post_discard<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
    ) -> ApiResult<()> {
        self.send(Method::POST, path, Some(body), bearer).await?;
        Ok(())
    }

    /// Build a request builder for custom requests
    pub fn request_builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner
            .request(method, self.url(path))
            .header(X_REQUEST_ID, Uuid::new_v4().to_string())
    }

    /// Send a single request and map non-2xx statuses to errors
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> ApiResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let url = self.url(path);
        let mut request = self
            .inner
            .request(method.clone(), &url)
            .header(X_REQUEST_ID, &request_id);

        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let start = Instant::now();
        let response = request.send().await?;
        let elapsed = start.elapsed();
        let status = response.status();

        if status.is_success() {
            debug!(
                request_id = %request_id,
                method = %method,
                url = %url,
                status = status.as_u16(),
                elapsed_ms = elapsed.as_millis(),
                "Request succeeded"
            );
            Ok(response)
        } else {
            let text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&text);
            warn!(
                request_id = %request_id,
                method = %method,
                url = %url,
                status = status.as_u16(),
                message = %message,
                "Request failed"
            );
            Err(ApiError::api_response(status.as_u16(), message))
        }
    }
}

/// Flatten a backend error body into one message.
///
/// Field errors for `email`, `username` and `password` win, then `detail`,
/// then the first field in body order. Non-JSON bodies are returned trimmed.
pub(crate) fn extract_error_message(body: &str) -> String {
    let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() {
            "Unknown error".to_string()
        } else {
            trimmed.to_string()
        };
    };

    for (field, label) in PRIORITY_FIELDS {
        if let Some(msg) = map.get(field).and_then(first_message) {
            return format!("{label}: {msg}");
        }
    }

    if let Some(detail) = map.get("detail").and_then(first_message) {
        return detail;
    }

    map.iter()
        .find_map(|(key, value)| first_message(value).map(|msg| format!("{key}: {msg}")))
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// A string, or the first string of an array
fn first_message(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => items.first().and_then(first_message),
        _ => None,
    }
}
