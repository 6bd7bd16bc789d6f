use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Result, RxMatrixError};

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl From<&ClientConfig> for ApiConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            timeout_secs: config.request_timeout_secs,
        }
    }
}

/// Thin HTTP client for the `/api/*` lookup endpoints.
///
/// Non-2xx statuses and transport failures come back as transport errors;
/// a body that is not JSON is a malformed response.
#[derive(Clone)]
pub struct MatrixApiClient {
    client: Client,
    config: ApiConfig,
}

impl MatrixApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| RxMatrixError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub(crate) async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RxMatrixError::Upstream(format!(
                "{path} returned {status}: {body}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::debug!(
                path,
                body_len = body.len(),
                body_preview = %body.chars().take(100).collect::<String>(),
                "Response body is not JSON"
            );
            RxMatrixError::MalformedResponse(format!("{path} returned invalid JSON: {e}"))
        })
    }
}
