//! Lamoda catalogue records, requested by category.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::entity::LamodaProduct;

use super::{parse_timestamp, SourceError, SourceRecord};

fn default_currency() -> String {
    "RUB".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RawLamodaProduct {
    pub sku: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub price_currency: String,
    #[serde(default)]
    pub price_valid_until: Option<String>,
}

impl SourceRecord for LamodaProduct {
    const PARAM: &'static str = "category";
    const ALL_ROWS: bool = true;
    type Raw = RawLamodaProduct;

    fn from_raw(
        raw: RawLamodaProduct,
        key: &str,
        parsed_at: DateTime<Utc>,
    ) -> Result<Self, SourceError> {
        let price_valid_until = raw
            .price_valid_until
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;

        Ok(LamodaProduct {
            category: key.to_string(),
            sku: raw.sku,
            url: raw.url,
            description: raw.description,
            price: raw.price,
            price_currency: raw.price_currency,
            price_valid_until,
            parsed_at,
        })
    }
}
