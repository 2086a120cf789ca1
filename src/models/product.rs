use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog view of a product, as returned by lookup and search suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub image: String,
}
