//! HTTP plumbing shared by every endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::ApiError;
use super::types::ErrorBody;
use crate::config::ClientConfig;

/// Client for the Cravii PHP backend.
///
/// Cheap to clone; clones share the connection pool and the session cookie.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_base_url.clone(), config.http_timeout)
    }

    /// Create a client for an explicit base URL.
    ///
    /// The base URL should end with `/`; endpoint names are joined onto it.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_base_url(base_url: Url, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// The backend API root.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, script: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(script)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Execute a GET request against a backend script.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        script: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(script, query)?;
        let response = self.inner.client.get(url).send().await?;
        Self::handle_response(script, response).await
    }

    /// Execute a POST request with a JSON body against a backend script.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        script: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(script, &[])?;
        let response = self.inner.client.post(url).json(body).send().await?;
        Self::handle_response(script, response).await
    }

    /// Validate status and content type, then parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        script: &str,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);

            if status == StatusCode::UNAUTHORIZED {
                tracing::warn!(endpoint = script, "Backend rejected session");
                return Err(ApiError::Unauthorized(message));
            }

            tracing::error!(
                endpoint = script,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let is_json = content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"));
        if !is_json {
            tracing::error!(
                endpoint = script,
                content_type = ?content_type,
                "Backend returned a non-JSON response"
            );
            return Err(ApiError::InvalidContentType(content_type));
        }

        if body.trim().is_empty() {
            return Err(ApiError::EmptyResponse);
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                endpoint = script,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
