use async_trait::async_trait;
use serde_json::Value;

use super::api::MatrixApiClient;
use super::InteractionLookup;
use crate::error::{Result, RxMatrixError};
use crate::models::{InteractionRecord, Severity};

/// Fetches the interaction record for one pair via `GET /api/interactions`.
#[derive(Clone)]
pub struct InteractionClient {
    api: MatrixApiClient,
}

impl InteractionClient {
    pub fn new(api: MatrixApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl InteractionLookup for InteractionClient {
    async fn fetch_interaction(&self, id_a: &str, id_b: &str) -> Result<Option<InteractionRecord>> {
        if id_a.trim().is_empty() || id_b.trim().is_empty() {
            return Err(RxMatrixError::Validation(
                "Both item ids are required for an interaction lookup".to_string(),
            ));
        }

        let value = self
            .api
            .get_json("/api/interactions", &[("a", id_a), ("b", id_b)])
            .await?;

        decode_record(value, id_a, id_b)
    }
}

/// `{}` and objects without a recognisable `severity` mean "no record".
/// Anything that claims a severity must decode as a full record.
pub(crate) fn decode_record(
    value: Value,
    id_a: &str,
    id_b: &str,
) -> Result<Option<InteractionRecord>> {
    let Value::Object(mut fields) = value else {
        return Err(RxMatrixError::MalformedResponse(
            "interaction payload is not an object".to_string(),
        ));
    };

    let Some(severity) = fields
        .get("severity")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<Severity>().ok())
    else {
        return Ok(None);
    };

    fields.insert(
        "severity".to_string(),
        Value::String(severity.as_str().to_string()),
    );

    fields
        .entry("itemA")
        .or_insert_with(|| Value::String(id_a.to_string()));
    fields
        .entry("itemB")
        .or_insert_with(|| Value::String(id_b.to_string()));

    serde_json::from_value(Value::Object(fields))
        .map(Some)
        .map_err(|e| RxMatrixError::MalformedResponse(format!("interaction record: {e}")))
}
