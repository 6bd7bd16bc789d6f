use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct InteractionParams {
    pub a: Option<String>,
    pub b: Option<String>,
}

/// `GET /api/interactions?a=<id>&b=<id>`. `{}` when either id is missing or
/// no interaction is known.
pub async fn interactions(
    State(state): State<AppState>,
    Query(params): Query<InteractionParams>,
) -> Result<Json<Value>> {
    let (Some(a), Some(b)) = (
        params.a.filter(|a| !a.trim().is_empty()),
        params.b.filter(|b| !b.trim().is_empty()),
    ) else {
        return Ok(Json(json!({})));
    };

    match state.lookup.interaction(a.trim(), b.trim()).await? {
        Some(record) => Ok(Json(serde_json::to_value(record)?)),
        None => Ok(Json(json!({}))),
    }
}
