//! Scripted end-to-end walkthrough against the in-memory backend: sign in,
//! build a cart, apply a coupon, check out with cash on delivery, then walk
//! the order through its lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use storefront_core::{
    backend::{memory::InMemoryBackend, StorefrontBackend},
    events,
    models::{
        Address, CartLine, Coupon, CouponKind, CouponStatus, OrderStatus, PaymentMethod,
        ProductSummary,
    },
    services::{
        CartStore, CheckoutOrchestrator, CheckoutOutcome, CouponValidator, OrderLifecycleService,
        SuggestionService,
    },
    AppConfig, AuthSession,
};

fn seed(backend: &InMemoryBackend) -> (Uuid, Uuid) {
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
    backend.seed_coupon(Coupon {
        code: "SAVE10".to_string(),
        kind: CouponKind::Percentage,
        value: dec!(10),
        min_order_amount: Some(dec!(20.00)),
        max_discount_amount: None,
        usage_limit: Some(100),
        usage_count: 0,
        valid_from: Utc::now() - Duration::days(1),
        valid_to: Utc::now() + Duration::days(30),
        status: CouponStatus::Active,
    });
    (tee, tote)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let backend = Arc::new(InMemoryBackend::new());
    let (tee, tote) = seed(&backend);

    let (event_tx, mut event_rx) = events::channel(64);
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            info!(?event, "domain event");
        }
    });

    let session = AuthSession::new();
    let cart = CartStore::new(backend.clone(), &session, event_tx.clone());
    cart.spawn_session_listener(&session);

    session.login(Uuid::new_v4());
    cart.refresh().await?;

    // Build the cart from the catalog: two tees and a tote.
    let tee_product = backend.fetch_product(tee).await?;
    let tote_product = backend.fetch_product(tote).await?;
    cart.add(
        CartLine::new(
            tee_product.product_id,
            tee_product.name,
            tee_product.unit_price,
            tee_product.image,
            1,
            None,
            None,
        ),
        2,
    )
    .await?;
    cart.add(
        CartLine::new(
            tote_product.product_id,
            tote_product.name,
            tote_product.unit_price,
            tote_product.image,
            1,
            None,
            None,
        ),
        1,
    )
    .await?;
    info!(
        "Cart: {} items, subtotal {}",
        cart.total_items().await,
        cart.total_price().await
    );

    // Search suggestions.
    let search = SuggestionService::new(backend.clone(), &config);
    if let Some(hits) = search.suggest("tote").await? {
        info!("Suggestions for 'tote': {:?}", hits.iter().map(|p| &p.name).collect::<Vec<_>>());
    }

    // Checkout with a coupon, cash on delivery to the home country.
    let validator = CouponValidator::new(backend.coupons());
    let mut checkout =
        CheckoutOrchestrator::new(
            backend.clone(),
            cart.clone(),
            validator,
            event_tx.clone(),
            &config,
        );

    let applied = checkout.apply_coupon("SAVE10").await;
    info!(?applied, "coupon");

    checkout.set_country("India")?;
    checkout.set_state("Maharashtra")?;
    checkout.set_city("Mumbai")?;
    checkout.set_payment_method(PaymentMethod::CashOnDelivery)?;

    let breakdown = checkout.breakdown().await;
    info!(?breakdown, "price breakdown");

    let outcome = checkout
        .place_order(Address {
            full_name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: None,
            city: "Mumbai".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "400001".to_string(),
            country: "India".to_string(),
        })
        .await?;
    let order = match outcome {
        CheckoutOutcome::Placed(order) => order,
        CheckoutOutcome::AwaitingPayment => unreachable!("cash on delivery places immediately"),
    };
    info!("Placed order {} ({})", order.order_number, order.status);

    // Walk the order through its lifecycle.
    let lifecycle = OrderLifecycleService::new(backend.clone(), event_tx);
    for next in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::Shipped,
    ] {
        lifecycle.advance(&order.order_number, next, None).await?;
    }
    let delivered = lifecycle
        .advance(&order.order_number, OrderStatus::Delivered, Some("left at door"))
        .await?;
    info!(
        "Order {} delivered at {:?}",
        delivered.order_number, delivered.delivered_date
    );

    Ok(())
}
