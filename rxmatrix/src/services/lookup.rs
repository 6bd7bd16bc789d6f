use chrono::Utc;

use crate::config::GatewayConfig;
use crate::error::Result;
use crate::models::{CanonicalItem, EvidenceGrade, InteractionRecord, PairKey, Severity, SourceLink};
use crate::upstream::{
    query_key, references, rxcui_from_id, RxNavClient, UpstreamCache, UpstreamInteraction,
};

/// Source whose interaction data is graded higher than the rest.
const HIGH_PRIORITY_SOURCE: &str = "ONCHigh";

/// Answers the gateway endpoints from RxNav, memoising results per query and
/// per pair.
#[derive(Clone)]
pub struct LookupService {
    rxnav: RxNavClient,
    max_suggestions: usize,
    suggestions: UpstreamCache<Vec<CanonicalItem>>,
    interactions: UpstreamCache<Option<InteractionRecord>>,
}

impl LookupService {
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        Ok(Self {
            rxnav: RxNavClient::new(config)?,
            max_suggestions: config.max_suggestions,
            suggestions: UpstreamCache::new(config.cache_size),
            interactions: UpstreamCache::new(config.cache_size),
        })
    }

    /// Ranked canonical items for `query`. Upstream failures degrade to an
    /// empty list and are not cached.
    pub async fn normalize(&self, query: &str) -> Vec<CanonicalItem> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let key = query_key(query);
        if let Some(cached) = self.suggestions.get(&key) {
            tracing::debug!(query, "Normalize cache hit");
            return cached;
        }

        match self.rxnav.approximate_term(query, self.max_suggestions).await {
            Ok(mut items) => {
                items.truncate(self.max_suggestions);
                self.suggestions.put(key, items.clone());
                items
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "RxNav approximate term search failed");
                Vec::new()
            }
        }
    }

    /// Interaction record for two canonical ids, `None` when upstream knows
    /// of none or the ids are not RxNorm concepts.
    pub async fn interaction(&self, id_a: &str, id_b: &str) -> Result<Option<InteractionRecord>> {
        let (Some(rxcui_a), Some(rxcui_b)) = (rxcui_from_id(id_a), rxcui_from_id(id_b)) else {
            tracing::debug!(id_a, id_b, "Ids are not RxNorm concepts, no interaction lookup");
            return Ok(None);
        };

        let key = PairKey::new(id_a, id_b);
        if let Some(cached) = self.interactions.get(key.as_str()) {
            tracing::debug!(pair_key = %key, "Interaction cache hit");
            return Ok(cached);
        }

        let record = match self.rxnav.interaction(rxcui_a, rxcui_b).await? {
            Some(upstream) => Some(build_record(id_a, id_b, rxcui_a, rxcui_b, upstream)?),
            None => None,
        };

        self.interactions.put(key.as_str().to_string(), record.clone());
        Ok(record)
    }
}

fn map_severity(raw: Option<&str>) -> Severity {
    match raw.unwrap_or_default().trim().to_lowercase().as_str() {
        "contraindicated" => Severity::Contraindicated,
        "major" | "high" => Severity::Major,
        "minor" | "low" => Severity::Minor,
        _ => Severity::Moderate,
    }
}

fn build_record(
    id_a: &str,
    id_b: &str,
    rxcui_a: &str,
    rxcui_b: &str,
    upstream: UpstreamInteraction,
) -> Result<InteractionRecord> {
    let retrieved_at = Utc::now();
    let severity = map_severity(upstream.severity.as_deref());
    let evidence = if upstream.source_name.as_deref() == Some(HIGH_PRIORITY_SOURCE) {
        EvidenceGrade::B
    } else {
        EvidenceGrade::C
    };
    let guidance = upstream
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| "Interaction reported; consult a pharmacist.".to_string());

    let mut sources = Vec::new();
    if let Some(source_name) = &upstream.source_name {
        sources.push(SourceLink {
            name: format!("RxNav ({source_name})"),
            url: "https://lhncbc.nlm.nih.gov/RxNav/APIs/InteractionAPIs.html".to_string(),
            snippet: upstream.description.clone(),
            retrieved_at: Some(retrieved_at),
        });
    }
    sources.extend(references::reference_links(rxcui_a, rxcui_b, retrieved_at)?);

    Ok(InteractionRecord {
        item_a: id_a.to_string(),
        item_b: id_b.to_string(),
        severity,
        guidance,
        mechanism: upstream.comment.filter(|c| !c.trim().is_empty()),
        evidence,
        sources,
    })
}
