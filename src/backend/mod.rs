//! Persistence boundary of the storefront core.
//!
//! The core never owns storage or a transport; it talks to whatever serves
//! the cart, catalog and orders through [`StorefrontBackend`]. Any
//! JSON-over-HTTP or RPC implementation satisfying these operations is
//! conformant. [`memory::InMemoryBackend`] is the reference implementation
//! used by tests and the demo binary.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{Cart, CartLine, LineKey, Order, ProductSummary},
};

#[async_trait]
pub trait StorefrontBackend: Send + Sync {
    /// Returns the server-side cart snapshot for a customer.
    async fn fetch_cart(&self, customer_id: Uuid) -> Result<Cart, ServiceError>;

    /// Adds a line to a customer's cart, merging with an existing line of
    /// the same identity key by incrementing its quantity.
    async fn add_cart_line(&self, customer_id: Uuid, line: CartLine) -> Result<(), ServiceError>;

    /// Sets the quantity of a cart line. A quantity of zero or less removes
    /// the line.
    async fn update_cart_line(
        &self,
        customer_id: Uuid,
        key: &LineKey,
        quantity: i32,
    ) -> Result<(), ServiceError>;

    /// Removes a cart line. Removing an absent line is a no-op.
    async fn remove_cart_line(
        &self,
        customer_id: Uuid,
        key: &LineKey,
    ) -> Result<(), ServiceError>;

    /// Empties a customer's cart. Idempotent.
    async fn clear_cart(&self, customer_id: Uuid) -> Result<(), ServiceError>;

    /// Persists a newly created order.
    async fn create_order(&self, order: Order) -> Result<Order, ServiceError>;

    async fn fetch_order_by_number(&self, order_number: &str) -> Result<Order, ServiceError>;

    /// Persists an order's mutable fields (`status`, `notes`,
    /// `delivered_date`). Everything else on an existing order is immutable.
    async fn update_order_status(&self, order: &Order) -> Result<Order, ServiceError>;

    async fn fetch_product(&self, product_id: Uuid) -> Result<ProductSummary, ServiceError>;

    /// Case-insensitive product search for suggestions.
    async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, ServiceError>;

    /// Records one redemption of a coupon after a confirmed order creation.
    async fn increment_coupon_usage(&self, code: &str) -> Result<(), ServiceError>;
}
