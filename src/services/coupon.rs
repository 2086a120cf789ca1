use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Coupon, CouponKind, CouponOutcome, CouponRejection, CouponStatus};

/// Validates coupon codes against a subtotal.
///
/// Pure: the validator is constructed from the coupon set it may accept and
/// touches nothing external. Rules run in a fixed order and the first
/// failure wins.
pub struct CouponValidator {
    coupons: HashMap<String, Coupon>,
}

impl CouponValidator {
    pub fn new(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        Self {
            coupons: coupons
                .into_iter()
                .map(|coupon| (coupon.code.to_uppercase(), coupon))
                .collect(),
        }
    }

    /// Resolves and validates a code, returning the clamped discount on
    /// acceptance.
    pub fn validate(&self, code: &str, subtotal: Decimal, now: DateTime<Utc>) -> CouponOutcome {
        let coupon = match self.coupons.get(&code.trim().to_uppercase()) {
            Some(coupon) => coupon,
            None => return CouponOutcome::Rejected(CouponRejection::UnknownCode),
        };

        if coupon.status != CouponStatus::Active || now > coupon.valid_to {
            return CouponOutcome::Rejected(CouponRejection::Expired);
        }
        if now < coupon.valid_from {
            return CouponOutcome::Rejected(CouponRejection::NotYetActive);
        }
        if let Some(limit) = coupon.usage_limit {
            if coupon.usage_count >= limit {
                return CouponOutcome::Rejected(CouponRejection::UsageExceeded);
            }
        }
        if let Some(minimum) = coupon.min_order_amount {
            if subtotal < minimum {
                debug!(
                    "Subtotal {} is below minimum order amount {}",
                    subtotal, minimum
                );
                return CouponOutcome::Rejected(CouponRejection::BelowMinimum);
            }
        }

        let raw = match coupon.kind {
            CouponKind::Percentage => {
                (subtotal * coupon.value / Decimal::from(100)).round_dp(2)
            }
            CouponKind::Fixed => coupon.value,
        };

        // Discount can never exceed the subtotal or the coupon's cap.
        let mut discount = raw.min(subtotal);
        if let Some(cap) = coupon.max_discount_amount {
            discount = discount.min(cap);
        }

        CouponOutcome::Accepted {
            code: coupon.code.clone(),
            discount,
        }
    }
}
