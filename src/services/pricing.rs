use rust_decimal::Decimal;

use crate::{
    config::AppConfig,
    models::{Cart, CouponOutcome, PriceBreakdown},
};

/// Pure pricing function from (cart, coupon result) to a price breakdown.
///
/// Shipping is free once the discounted subtotal reaches the configured
/// threshold, otherwise a flat fee (zero for an empty cart). Tax, when
/// enabled, is a flat rate on the discounted subtotal; inclusion is a
/// configuration flag, not a code fork.
#[derive(Debug, Clone)]
pub struct PricingEngine {
    free_shipping_threshold: Decimal,
    flat_shipping_rate: Decimal,
    tax_rate: Option<Decimal>,
}

impl PricingEngine {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            free_shipping_threshold: config.free_shipping_threshold,
            flat_shipping_rate: config.flat_shipping_rate,
            tax_rate: config.tax_rate,
        }
    }

    /// Computes the breakdown for a cart and an applied-coupon outcome.
    pub fn compute(&self, cart: &Cart, coupon: &CouponOutcome) -> PriceBreakdown {
        self.compute_from_subtotal(cart.total_price(), coupon.discount())
    }

    /// Breakdown from raw amounts; independently testable without a cart.
    pub fn compute_from_subtotal(&self, subtotal: Decimal, discount: Decimal) -> PriceBreakdown {
        // The validator already clamps; guard anyway so the breakdown
        // invariant holds for any caller.
        let discount = discount.min(subtotal).max(Decimal::ZERO);
        let discounted = subtotal - discount;

        let shipping = if subtotal <= Decimal::ZERO {
            Decimal::ZERO
        } else if discounted >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.flat_shipping_rate
        };

        let tax = self
            .tax_rate
            .map(|rate| (discounted * rate).round_dp(2))
            .unwrap_or(Decimal::ZERO);

        PriceBreakdown {
            subtotal,
            discount,
            shipping,
            tax,
            total: subtotal - discount + shipping + tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn engine() -> PricingEngine {
        PricingEngine::new(&AppConfig::default())
    }

    fn engine_with_tax(rate: Decimal) -> PricingEngine {
        let config = AppConfig {
            tax_rate: Some(rate),
            ..AppConfig::default()
        };
        PricingEngine::new(&config)
    }

    // ==================== Breakdown Invariant Tests ====================

    #[test]
    fn test_total_identity() {
        let b = engine().compute_from_subtotal(dec!(40.00), dec!(4.00));
        assert_eq!(b.total, b.subtotal - b.discount + b.shipping + b.tax);
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let b = engine().compute_from_subtotal(dec!(40.00), dec!(50.00));
        assert_eq!(b.discount, dec!(40.00));
        assert_eq!(b.total, b.shipping);
    }

    // ==================== Shipping Boundary Tests ====================

    #[test]
    fn test_free_shipping_exactly_at_threshold() {
        let b = engine().compute_from_subtotal(dec!(25.00), Decimal::ZERO);
        assert_eq!(b.shipping, Decimal::ZERO);
    }

    #[test]
    fn test_flat_fee_one_cent_below_threshold() {
        let b = engine().compute_from_subtotal(dec!(24.99), Decimal::ZERO);
        assert_eq!(b.shipping, dec!(5.99));
    }

    #[test]
    fn test_discount_can_pull_order_below_threshold() {
        // $30 gross, $10 off: the $20 discounted subtotal pays shipping.
        let b = engine().compute_from_subtotal(dec!(30.00), dec!(10.00));
        assert_eq!(b.shipping, dec!(5.99));
    }

    #[test]
    fn test_empty_cart_ships_free() {
        let b = engine().compute_from_subtotal(Decimal::ZERO, Decimal::ZERO);
        assert_eq!(b.shipping, Decimal::ZERO);
        assert_eq!(b.total, Decimal::ZERO);
    }

    // ==================== Tax Flag Tests ====================

    #[test]
    fn test_tax_disabled_by_default() {
        let b = engine().compute_from_subtotal(dec!(100.00), Decimal::ZERO);
        assert_eq!(b.tax, Decimal::ZERO);
    }

    #[test]
    fn test_tax_applied_to_discounted_subtotal() {
        let b = engine_with_tax(dec!(0.08)).compute_from_subtotal(dec!(100.00), dec!(10.00));
        assert_eq!(b.tax, dec!(7.20));
        assert_eq!(b.total, dec!(97.20));
    }

    // ==================== Cart Entry Point ====================

    #[test]
    fn test_compute_matches_raw_amounts() {
        use crate::models::{CartLine, CouponOutcome};
        use uuid::Uuid;

        let mut cart = Cart::empty();
        cart.add(CartLine::new(
            Uuid::new_v4(),
            "Tee",
            dec!(12.99),
            "tee.jpg",
            2,
            None,
            None,
        ));
        let coupon = CouponOutcome::Accepted {
            code: "SAVE".to_string(),
            discount: dec!(2.00),
        };

        let from_cart = engine().compute(&cart, &coupon);
        let from_raw = engine().compute_from_subtotal(dec!(25.98), dec!(2.00));
        assert_eq!(from_cart, from_raw);
    }

    // ==================== Worked Examples ====================

    #[test]
    fn test_forty_dollar_cart_with_ten_percent_coupon() {
        // $40 - $4 = $36, over the threshold: free shipping.
        let b = engine().compute_from_subtotal(dec!(40.00), dec!(4.00));
        assert_eq!(b.discount, dec!(4.00));
        assert_eq!(b.shipping, Decimal::ZERO);
        assert_eq!(b.total, dec!(36.00));
    }

    #[test]
    fn test_two_line_cart_below_threshold() {
        // $12.99 x 2 + $8.99 = $34.97... over default threshold; use the
        // raw sums to check the flat fee under a higher threshold instead.
        let config = AppConfig {
            free_shipping_threshold: dec!(50.00),
            ..AppConfig::default()
        };
        let b = PricingEngine::new(&config).compute_from_subtotal(dec!(34.97), Decimal::ZERO);
        assert_eq!(b.shipping, dec!(5.99));
        assert_eq!(b.total, dec!(40.96));
    }
}
