use super::amount::UsdAmount;
use serde::Deserialize;

/// One row of the payout batch, as handed over by the ingestion layer.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct RecipientInput {
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "address")]
    pub destination_address: String,
    #[serde(rename = "tag", default)]
    pub destination_tag: Option<u64>,
    #[serde(rename = "usd_amount")]
    pub requested_usd: UsdAmount,
}

impl RecipientInput {
    pub fn new(
        display_name: impl Into<String>,
        destination_address: impl Into<String>,
        destination_tag: Option<u64>,
        requested_usd: UsdAmount,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            destination_address: destination_address.into(),
            destination_tag,
            requested_usd,
        }
    }
}
