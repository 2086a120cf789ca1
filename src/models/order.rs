use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::address::Address;

/// Fixed forward sequence of statuses an order passes through, plus the
/// cancellation exit. `Delivered` and `Cancelled` are terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Online payment collected up front; the order exists only after the
    /// external payment confirmation.
    PayNow,
    /// Cash on delivery; restricted to the merchant's home country.
    CashOnDelivery,
}

/// Immutable order line captured from the cart at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub line_subtotal: Decimal,
}

/// The computed subtotal/discount/shipping/tax/total for a checkout.
///
/// Invariant: `total = subtotal - discount + shipping + tax`, every
/// component non-negative, `discount <= subtotal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// An order created at the end of checkout.
///
/// `items`, `address` and `breakdown` are immutable once created; only
/// `status`, `notes` and `delivered_date` mutate thereafter, and only
/// through the order state machine. Orders are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_number: String,
    pub items: Vec<OrderLine>,
    pub address: Address,
    pub breakdown: PriceBreakdown,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub order_date: DateTime<Utc>,
    pub delivered_date: Option<DateTime<Utc>>,
}

impl Order {
    /// Appends a timestamped note, preserving any existing notes.
    pub fn append_note(&mut self, note: &str, at: DateTime<Utc>) {
        let stamped = format!("[{}] {}", at.to_rfc3339(), note);
        match &mut self.notes {
            Some(existing) => {
                existing.push('\n');
                existing.push_str(&stamped);
            }
            None => self.notes = Some(stamped),
        }
    }
}

/// Generates an order number of the form `ORD-XXXXXXXX`.
pub fn generate_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", id[..8].to_uppercase())
}
