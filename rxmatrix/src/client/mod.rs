mod api;
mod interaction;
mod normalize;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{CanonicalItem, InteractionRecord};

pub use api::{ApiConfig, MatrixApiClient};
pub use interaction::InteractionClient;
pub use normalize::{NormalizationClient, DEFAULT_MAX_SUGGESTIONS};

/// Resolves free text into canonical items. Infallible by contract.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn normalize(&self, query: &str) -> Vec<CanonicalItem>;
}

/// Looks up the interaction between two canonical item ids.
///
/// `Ok(None)` means the service answered and knows of no interaction;
/// `Err` means the check itself failed.
#[async_trait]
pub trait InteractionLookup: Send + Sync {
    async fn fetch_interaction(&self, id_a: &str, id_b: &str) -> Result<Option<InteractionRecord>>;
}
