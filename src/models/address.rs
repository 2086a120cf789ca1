use serde::{Deserialize, Serialize};

/// Shopper-entered shipping destination.
///
/// All fields except `address_line2` are required before checkout proceeds;
/// see [`crate::services::checkout::validate_address`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}
