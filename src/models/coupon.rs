use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponKind {
    /// `value` is a percentage of the subtotal.
    Percentage,
    /// `value` is a fixed amount.
    Fixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponStatus {
    Active,
    Inactive,
    Expired,
}

/// A discount code with a validity window, usage cap, and min/max
/// constraints. Immutable input to the validator; only the admin side
/// mutates coupons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: Decimal,
    pub min_order_amount: Option<Decimal>,
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: Option<u32>,
    pub usage_count: u32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub status: CouponStatus,
}

/// Why a coupon was rejected. Mutually exclusive, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CouponRejection {
    UnknownCode,
    Expired,
    NotYetActive,
    UsageExceeded,
    BelowMinimum,
}

/// Result of validating a coupon code against a subtotal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CouponOutcome {
    Accepted { code: String, discount: Decimal },
    Rejected(CouponRejection),
}

impl CouponOutcome {
    /// The discount this outcome contributes to a breakdown; zero when
    /// rejected.
    pub fn discount(&self) -> Decimal {
        match self {
            Self::Accepted { discount, .. } => *discount,
            Self::Rejected(_) => Decimal::ZERO,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
