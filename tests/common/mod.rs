#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use uuid::Uuid;

use storefront_core::{
    backend::memory::InMemoryBackend,
    events::{self, EventSender},
    models::{Address, CartLine, Coupon, CouponKind, CouponStatus, LineKey, ProductSummary},
    services::{CartStore, CheckoutOrchestrator, CouponValidator},
    AppConfig, AuthSession,
};

/// A fully wired storefront over the in-memory backend, seeded with two
/// products and two coupons, with domain events drained in the background.
pub struct TestApp {
    pub backend: Arc<InMemoryBackend>,
    pub session: AuthSession,
    pub cart: CartStore,
    pub events: EventSender,
    pub config: AppConfig,
    pub tee: Uuid,
    pub tote: Uuid,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_config(AppConfig::default()).await
}

pub async fn spawn_app_with_config(config: AppConfig) -> TestApp {
    let backend = Arc::new(InMemoryBackend::new());

    let tee = Uuid::new_v4();
    let tote = Uuid::new_v4();
    backend.seed_product(ProductSummary {
        product_id: tee,
        name: "Organic Cotton Tee".to_string(),
        unit_price: dec!(12.99),
        image: "tee.jpg".to_string(),
    });
    backend.seed_product(ProductSummary {
        product_id: tote,
        name: "Canvas Tote".to_string(),
        unit_price: dec!(8.99),
        image: "tote.jpg".to_string(),
    });
    backend.seed_coupon(coupon("SAVE10", CouponKind::Percentage, dec!(10)));
    backend.seed_coupon({
        let mut c = coupon("ONESHOT", CouponKind::Fixed, dec!(5.00));
        c.usage_limit = Some(1);
        c
    });

    let (events, mut rx) = events::channel(256);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });

    let session = AuthSession::new();
    let cart = CartStore::new(backend.clone(), &session, events.clone());

    TestApp {
        backend,
        session,
        cart,
        events,
        config,
        tee,
        tote,
    }
}

pub fn coupon(code: &str, kind: CouponKind, value: rust_decimal::Decimal) -> Coupon {
    Coupon {
        code: code.to_string(),
        kind,
        value,
        min_order_amount: None,
        max_discount_amount: None,
        usage_limit: None,
        usage_count: 0,
        valid_from: Utc::now() - Duration::days(1),
        valid_to: Utc::now() + Duration::days(30),
        status: CouponStatus::Active,
    }
}

impl TestApp {
    /// Logs a fresh customer in and syncs the cart to their (empty)
    /// server-side cart.
    pub async fn login(&self) -> Uuid {
        let customer_id = Uuid::new_v4();
        self.session.login(customer_id);
        self.cart.refresh().await.expect("refresh after login");
        customer_id
    }

    pub fn tee_line(&self) -> CartLine {
        CartLine::new(
            self.tee,
            "Organic Cotton Tee",
            dec!(12.99),
            "tee.jpg",
            1,
            Some("M".to_string()),
            None,
        )
    }

    pub fn tee_key(&self) -> LineKey {
        self.tee_line().key()
    }

    pub fn tote_line(&self) -> CartLine {
        CartLine::new(self.tote, "Canvas Tote", dec!(8.99), "tote.jpg", 1, None, None)
    }

    /// A checkout session over this app's cart, validating against the
    /// backend's seeded coupons.
    pub fn checkout(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(
            self.backend.clone(),
            self.cart.clone(),
            CouponValidator::new(self.backend.coupons()),
            self.events.clone(),
            &self.config,
        )
    }

    pub fn valid_address(&self) -> Address {
        Address {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "400001".to_string(),
            country: "India".to_string(),
        }
    }
}
