use chrono::{DateTime, Utc};
use url::Url;

use crate::error::Result;
use crate::models::SourceLink;

const MEDLINEPLUS_CONNECT_URL: &str = "https://connect.medlineplus.gov/application";
/// HL7 code system OID for RxNorm.
const RXNORM_CODE_SYSTEM: &str = "2.16.840.1.113883.6.88";
const DAILYMED_SEARCH_URL: &str = "https://dailymed.nlm.nih.gov/dailymed/search.cfm";
const NCCIH_HERBS_URL: &str = "https://www.nccih.nih.gov/health/herbsataglance";

/// MedlinePlus Connect patient information for one RxCUI.
pub fn medlineplus_link(rxcui: &str) -> Result<SourceLink> {
    let url = Url::parse_with_params(
        MEDLINEPLUS_CONNECT_URL,
        &[
            ("mainSearchCriteria.v.cs", RXNORM_CODE_SYSTEM),
            ("mainSearchCriteria.v.c", rxcui),
            ("knowledgeResponseType", "text/html"),
        ],
    )?;
    Ok(SourceLink::new("MedlinePlus Connect", url.as_str()))
}

/// DailyMed label search for one RxCUI.
pub fn dailymed_link(rxcui: &str) -> Result<SourceLink> {
    let url = Url::parse_with_params(
        DAILYMED_SEARCH_URL,
        &[("labeltype", "all"), ("query", rxcui)],
    )?;
    Ok(SourceLink::new("DailyMed", url.as_str()))
}

pub fn nccih_link() -> SourceLink {
    SourceLink::new("NCCIH Herbs at a Glance", NCCIH_HERBS_URL)
}

/// Monograph links attached to every gateway interaction record, in display
/// order, stamped with the retrieval time.
pub fn reference_links(
    rxcui_a: &str,
    rxcui_b: &str,
    retrieved_at: DateTime<Utc>,
) -> Result<Vec<SourceLink>> {
    let mut links = vec![
        medlineplus_link(rxcui_a)?,
        medlineplus_link(rxcui_b)?,
        dailymed_link(rxcui_a)?,
        dailymed_link(rxcui_b)?,
        nccih_link(),
    ];
    for link in &mut links {
        link.retrieved_at = Some(retrieved_at);
    }
    Ok(links)
}
