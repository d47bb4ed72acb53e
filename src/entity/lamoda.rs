use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Tracked;

/// A Lamoda catalogue product.
///
/// Requested, listed and deleted by category; unique by category and sku.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Tracked)]
#[tracked(kind = "lamoda_product", collection = "lamoda_products")]
pub struct LamodaProduct {
    #[tracked(key, identity)]
    pub category: String,
    #[tracked(identity)]
    pub sku: String,
    pub url: String,
    pub description: String,
    pub price: f64,
    pub price_currency: String,
    pub price_valid_until: Option<DateTime<Utc>>,
    #[tracked(parsed_at)]
    pub parsed_at: DateTime<Utc>,
}
