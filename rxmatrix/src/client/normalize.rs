use async_trait::async_trait;
use serde::Deserialize;

use super::api::MatrixApiClient;
use super::SuggestionSource;
use crate::error::{Result, RxMatrixError};
use crate::models::CanonicalItem;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

#[derive(Debug, Deserialize)]
struct NormalizeResponse {
    canonical: Vec<CanonicalItem>,
}

/// Turns free text into ranked canonical items via `GET /api/normalize`.
///
/// Never fails: empty queries short-circuit and every transport or decoding
/// problem degrades to "no suggestions".
#[derive(Clone)]
pub struct NormalizationClient {
    api: MatrixApiClient,
    max_results: usize,
}

impl NormalizationClient {
    pub fn new(api: MatrixApiClient) -> Self {
        Self {
            api,
            max_results: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    async fn lookup(&self, query: &str) -> Result<Vec<CanonicalItem>> {
        let value = self.api.get_json("/api/normalize", &[("q", query)]).await?;
        let response: NormalizeResponse = serde_json::from_value(value).map_err(|e| {
            RxMatrixError::MalformedResponse(format!("normalize payload has unexpected shape: {e}"))
        })?;
        Ok(response.canonical)
    }
}

#[async_trait]
impl SuggestionSource for NormalizationClient {
    async fn normalize(&self, query: &str) -> Vec<CanonicalItem> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.lookup(query).await {
            Ok(mut items) => {
                items.truncate(self.max_results);
                tracing::debug!(query, results = items.len(), "Normalized query");
                items
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Normalization failed, returning no suggestions");
                Vec::new()
            }
        }
    }
}
