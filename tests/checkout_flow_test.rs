mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use storefront_core::{
    models::{CouponRejection, OrderStatus, PaymentMethod},
    services::{CheckoutOutcome, CouponApplication},
    AppConfig, ServiceError,
};

use common::{spawn_app, spawn_app_with_config};

// ==================== Pricing Through Checkout Tests ====================

#[tokio::test]
async fn test_worked_example_below_threshold_pays_flat_fee() {
    // Two $12.99 tees and one $8.99 tote against a $50 threshold.
    let app = spawn_app_with_config(AppConfig {
        free_shipping_threshold: dec!(50.00),
        ..AppConfig::default()
    })
    .await;
    app.login().await;
    app.cart.add(app.tee_line(), 2).await.expect("add tees");
    app.cart.add(app.tote_line(), 1).await.expect("add tote");

    let checkout = app.checkout();
    let b = checkout.breakdown().await;
    assert_eq!(b.subtotal, dec!(34.97));
    assert_eq!(b.shipping, dec!(5.99));
    assert_eq!(b.total, dec!(40.96));
}

#[tokio::test]
async fn test_default_threshold_gives_free_shipping() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 2).await.expect("add tees");
    app.cart.add(app.tote_line(), 1).await.expect("add tote");

    let b = app.checkout().breakdown().await;
    assert_eq!(b.shipping, dec!(0));
    assert_eq!(b.total, dec!(34.97));
}

// ==================== Coupon Application Tests ====================

#[tokio::test]
async fn test_coupon_applies_once_per_session() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 2).await.expect("add");
    app.cart.add(app.tote_line(), 1).await.expect("add");

    let mut checkout = app.checkout();
    // 10% of $34.97, rounded to cents.
    assert_eq!(
        checkout.apply_coupon("SAVE10").await,
        CouponApplication::Applied {
            discount: dec!(3.50)
        }
    );
    assert_eq!(
        checkout.apply_coupon("ONESHOT").await,
        CouponApplication::AlreadyApplied
    );
    assert_eq!(checkout.applied_coupon(), Some("SAVE10"));

    let b = checkout.breakdown().await;
    assert_eq!(b.discount, dec!(3.50));
    assert_eq!(b.total, dec!(31.47));
}

#[tokio::test]
async fn test_rejected_coupon_does_not_consume_the_gate() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tote_line(), 1).await.expect("add");

    let mut checkout = app.checkout();
    assert_eq!(
        checkout.apply_coupon("BOGUS").await,
        CouponApplication::Rejected(CouponRejection::UnknownCode)
    );
    assert_matches!(
        checkout.apply_coupon("SAVE10").await,
        CouponApplication::Applied { .. }
    );
}

#[tokio::test]
async fn test_coupon_usage_recorded_at_order_creation() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 2).await.expect("add");

    let mut checkout = app.checkout();
    assert_matches!(
        checkout.apply_coupon("SAVE10").await,
        CouponApplication::Applied { .. }
    );
    checkout.set_country("India").expect("country");
    checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .expect("cod at home");

    assert_eq!(app.backend.coupon_usage("SAVE10"), Some(0));
    let outcome = checkout.place_order(app.valid_address()).await.expect("place");
    assert_matches!(outcome, CheckoutOutcome::Placed(_));
    assert_eq!(app.backend.coupon_usage("SAVE10"), Some(1));
}

// ==================== Payment Path Tests ====================

#[tokio::test]
async fn test_cash_on_delivery_places_immediately_and_clears_cart() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 2).await.expect("add");

    let mut checkout = app.checkout();
    checkout.set_country("India").expect("country");
    checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .expect("cod");

    let outcome = checkout.place_order(app.valid_address()).await.expect("place");
    let order = match outcome {
        CheckoutOutcome::Placed(order) => order,
        other => panic!("expected immediate placement, got {:?}", other),
    };

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_method, PaymentMethod::CashOnDelivery);
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(app.backend.order_count(), 1);
    assert!(app.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_online_payment_creates_order_only_after_confirmation() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 1).await.expect("add");

    let mut checkout = app.checkout();
    let outcome = checkout.place_order(app.valid_address()).await.expect("place");
    assert_eq!(outcome, CheckoutOutcome::AwaitingPayment);

    // Nothing exists until the payment confirmation lands.
    assert_eq!(app.backend.order_count(), 0);
    assert!(!app.cart.snapshot().await.is_empty());

    let order = checkout.confirm_payment().await.expect("confirm");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(app.backend.order_count(), 1);
    assert!(app.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_confirm_without_pending_payment_fails() {
    let app = spawn_app().await;
    app.login().await;

    let mut checkout = app.checkout();
    let err = checkout.confirm_payment().await.expect_err("nothing pending");
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn test_clear_failure_after_placement_is_retriable_without_duplicate() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 1).await.expect("add");

    let mut checkout = app.checkout();
    checkout.set_country("India").expect("country");
    checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .expect("cod");

    app.backend.inject_clear_failure();
    assert!(checkout.place_order(app.valid_address()).await.is_err());
    // The order was created; only the cart clear failed.
    assert_eq!(app.backend.order_count(), 1);

    let outcome = checkout.place_order(app.valid_address()).await.expect("retry");
    assert_matches!(outcome, CheckoutOutcome::Placed(_));
    assert_eq!(app.backend.order_count(), 1);
    assert!(app.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_placing_an_empty_cart_fails() {
    let app = spawn_app().await;
    app.login().await;

    let mut checkout = app.checkout();
    let err = checkout
        .place_order(app.valid_address())
        .await
        .expect_err("empty cart");
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

// ==================== Destination & Payment Gating Tests ====================

#[tokio::test]
async fn test_cod_requires_home_country_selected() {
    let app = spawn_app().await;
    let mut checkout = app.checkout();

    assert!(checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .is_err());

    checkout.set_country("India").expect("country");
    assert!(checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .is_ok());
}

#[tokio::test]
async fn test_leaving_home_country_silently_reverts_to_online_payment() {
    let app = spawn_app().await;
    let mut checkout = app.checkout();
    checkout.set_country("India").expect("country");
    checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .expect("cod");

    checkout.set_country("United States").expect("country");
    assert_eq!(checkout.payment_method(), PaymentMethod::PayNow);

    // Coming back home never re-selects cash on delivery by itself.
    checkout.set_country("India").expect("country");
    assert_eq!(checkout.payment_method(), PaymentMethod::PayNow);
}

#[tokio::test]
async fn test_changing_country_resets_state_and_city() {
    let app = spawn_app().await;
    let mut checkout = app.checkout();
    checkout.set_country("India").expect("country");
    checkout.set_state("Maharashtra").expect("state");
    checkout.set_city("Mumbai").expect("city");

    checkout.set_country("United States").expect("country");
    assert_eq!(checkout.selected_state(), None);
    assert_eq!(checkout.selected_city(), None);
}

#[tokio::test]
async fn test_state_must_belong_to_selected_country() {
    let app = spawn_app().await;
    let mut checkout = app.checkout();
    checkout.set_country("United Kingdom").expect("country");

    let err = checkout.set_state("Maharashtra").expect_err("wrong country");
    assert_matches!(err, ServiceError::ValidationFailed { .. });
}

#[tokio::test]
async fn test_cod_to_foreign_address_rejected_at_placement() {
    let app = spawn_app().await;
    app.login().await;
    app.cart.add(app.tee_line(), 1).await.expect("add");

    let mut checkout = app.checkout();
    checkout.set_country("India").expect("country");
    checkout
        .set_payment_method(PaymentMethod::CashOnDelivery)
        .expect("cod");

    let mut address = app.valid_address();
    address.country = "United States".to_string();
    let err = checkout.place_order(address).await.expect_err("foreign cod");
    assert_matches!(err, ServiceError::InvalidOperation(_));
    assert_eq!(app.backend.order_count(), 0);
}
