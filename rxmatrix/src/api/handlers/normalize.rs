use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::models::CanonicalItem;

#[derive(Debug, Deserialize)]
pub struct NormalizeParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub canonical: Vec<CanonicalItem>,
}

/// `GET /api/normalize?q=<text>`. Always 200; failures yield no candidates.
pub async fn normalize(
    State(state): State<AppState>,
    Query(params): Query<NormalizeParams>,
) -> Json<NormalizeResponse> {
    let canonical = state.lookup.normalize(&params.q).await;
    Json(NormalizeResponse { canonical })
}
