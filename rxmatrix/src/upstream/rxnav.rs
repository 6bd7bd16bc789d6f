use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::error::{Result, RxMatrixError};
use crate::models::{CanonicalItem, ItemType};

/// Prefix of the canonical ids the gateway hands out.
pub const RXCUI_PREFIX: &str = "rxcui:";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproximateTermResponse {
    #[serde(default)]
    approximate_group: Option<ApproximateGroup>,
}

#[derive(Debug, Deserialize)]
struct ApproximateGroup {
    #[serde(default)]
    candidate: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    rxcui: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionListResponse {
    #[serde(default)]
    full_interaction_type_group: Vec<InteractionTypeGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InteractionTypeGroup {
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default)]
    full_interaction_type: Vec<FullInteractionType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullInteractionType {
    #[serde(default)]
    comment: Option<String>,
    #[serde(default)]
    interaction_pair: Vec<InteractionPair>,
}

#[derive(Debug, Deserialize)]
struct InteractionPair {
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// First interaction RxNav reports for a pair, before it is shaped into a
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamInteraction {
    pub source_name: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
}

/// Client for the RxNav REST API (RxNorm approximate match and interactions).
#[derive(Clone)]
pub struct RxNavClient {
    client: Client,
    base_url: String,
}

impl RxNavClient {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RxMatrixError::Internal(format!("Failed to create RxNav client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.rxnav_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RxMatrixError::Upstream(format!(
                "RxNav {path} returned {status}: {body}"
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| RxMatrixError::MalformedResponse(format!("RxNav {path}: {e}")))
    }

    /// Approximate-term search. Candidates keep RxNav's rank order, are
    /// de-duplicated by RxCUI and dropped when they carry no name.
    pub async fn approximate_term(
        &self,
        term: &str,
        max_entries: usize,
    ) -> Result<Vec<CanonicalItem>> {
        let max_entries = max_entries.to_string();
        let response: ApproximateTermResponse = self
            .get(
                "/REST/approximateTerm.json",
                &[("term", term), ("maxEntries", &max_entries), ("option", "1")],
            )
            .await?;

        let candidates = response
            .approximate_group
            .map(|group| group.candidate)
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let items = candidates
            .into_iter()
            .filter_map(|candidate| {
                let name = candidate.name.filter(|n| !n.trim().is_empty())?;
                if !seen.insert(candidate.rxcui.clone()) {
                    return None;
                }
                Some(
                    CanonicalItem::new(
                        format!("{RXCUI_PREFIX}{}", candidate.rxcui),
                        title_case(&name),
                        ItemType::Drug,
                    )
                    .with_rxcui(candidate.rxcui),
                )
            })
            .collect();

        Ok(items)
    }

    /// Interaction lookup for two RxCUIs. `None` when RxNav lists nothing.
    pub async fn interaction(
        &self,
        rxcui_a: &str,
        rxcui_b: &str,
    ) -> Result<Option<UpstreamInteraction>> {
        let rxcuis = format!("{rxcui_a} {rxcui_b}");
        let response: InteractionListResponse = self
            .get("/REST/interaction/list.json", &[("rxcuis", &rxcuis)])
            .await?;

        for group in response.full_interaction_type_group {
            for interaction_type in group.full_interaction_type {
                if let Some(pair) = interaction_type.interaction_pair.into_iter().next() {
                    return Ok(Some(UpstreamInteraction {
                        source_name: group.source_name,
                        severity: pair.severity,
                        description: pair.description,
                        comment: interaction_type.comment,
                    }));
                }
            }
        }

        Ok(None)
    }
}

/// `rxcui:11289` → `11289`. Bare numeric ids are accepted as RxCUIs too.
pub fn rxcui_from_id(id: &str) -> Option<&str> {
    let rxcui = id.trim().strip_prefix(RXCUI_PREFIX).unwrap_or(id.trim());
    if !rxcui.is_empty() && rxcui.chars().all(|c| c.is_ascii_digit()) {
        Some(rxcui)
    } else {
        None
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
