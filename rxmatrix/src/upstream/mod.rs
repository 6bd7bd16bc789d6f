mod cache;
pub mod references;
mod rxnav;

pub use cache::{query_key, UpstreamCache};
pub use rxnav::{rxcui_from_id, RxNavClient, UpstreamInteraction, RXCUI_PREFIX};
