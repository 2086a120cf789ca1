use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    models::{Cart, CartLine, Coupon, LineKey, Order, ProductSummary},
};

use super::StorefrontBackend;

/// In-memory backend keyed per customer.
///
/// Cart mutations are atomic per customer through the map's entry API, so
/// concurrent writes merge rather than overwrite. Failure injection knobs
/// let tests exercise the mutation-failure and clear-retry paths.
#[derive(Default)]
pub struct InMemoryBackend {
    carts: DashMap<Uuid, Cart>,
    orders: DashMap<String, Order>,
    products: DashMap<Uuid, ProductSummary>,
    coupons: DashMap<String, Coupon>,
    fail_next_mutation: AtomicBool,
    fail_next_clear: AtomicBool,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_product(&self, product: ProductSummary) {
        self.products.insert(product.product_id, product);
    }

    pub fn seed_coupon(&self, coupon: Coupon) {
        self.coupons.insert(coupon.code.to_uppercase(), coupon);
    }

    pub fn coupons(&self) -> Vec<Coupon> {
        self.coupons.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn coupon_usage(&self, code: &str) -> Option<u32> {
        self.coupons
            .get(&code.to_uppercase())
            .map(|c| c.usage_count)
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Makes the next mutating cart operation fail once.
    pub fn inject_mutation_failure(&self) {
        self.fail_next_mutation.store(true, Ordering::SeqCst);
    }

    /// Makes the next cart clear fail once.
    pub fn inject_clear_failure(&self) {
        self.fail_next_clear.store(true, Ordering::SeqCst);
    }

    fn check_mutation_failure(&self) -> Result<(), ServiceError> {
        if self.fail_next_mutation.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::ExternalApiError(
                "injected mutation failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StorefrontBackend for InMemoryBackend {
    async fn fetch_cart(&self, customer_id: Uuid) -> Result<Cart, ServiceError> {
        Ok(self
            .carts
            .get(&customer_id)
            .map(|cart| cart.clone())
            .unwrap_or_default())
    }

    async fn add_cart_line(&self, customer_id: Uuid, line: CartLine) -> Result<(), ServiceError> {
        self.check_mutation_failure()?;
        self.carts
            .entry(customer_id)
            .or_default()
            .add(line);
        Ok(())
    }

    async fn update_cart_line(
        &self,
        customer_id: Uuid,
        key: &LineKey,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        self.check_mutation_failure()?;
        if let Some(mut cart) = self.carts.get_mut(&customer_id) {
            cart.set_quantity(key, quantity);
        }
        Ok(())
    }

    async fn remove_cart_line(
        &self,
        customer_id: Uuid,
        key: &LineKey,
    ) -> Result<(), ServiceError> {
        self.check_mutation_failure()?;
        if let Some(mut cart) = self.carts.get_mut(&customer_id) {
            cart.remove(key);
        }
        Ok(())
    }

    async fn clear_cart(&self, customer_id: Uuid) -> Result<(), ServiceError> {
        if self.fail_next_clear.swap(false, Ordering::SeqCst) {
            return Err(ServiceError::ExternalApiError(
                "injected clear failure".to_string(),
            ));
        }
        self.check_mutation_failure()?;
        self.carts.insert(customer_id, Cart::empty());
        Ok(())
    }

    async fn create_order(&self, order: Order) -> Result<Order, ServiceError> {
        if self.orders.contains_key(&order.order_number) {
            return Err(ServiceError::InvalidOperation(format!(
                "Order {} already exists",
                order.order_number
            )));
        }
        info!("Created order: {}", order.order_number);
        self.orders.insert(order.order_number.clone(), order.clone());
        Ok(order)
    }

    async fn fetch_order_by_number(&self, order_number: &str) -> Result<Order, ServiceError> {
        self.orders
            .get(order_number)
            .map(|order| order.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_number)))
    }

    async fn update_order_status(&self, order: &Order) -> Result<Order, ServiceError> {
        let mut stored = self.orders.get_mut(&order.order_number).ok_or_else(|| {
            ServiceError::NotFound(format!("Order {} not found", order.order_number))
        })?;
        stored.status = order.status;
        stored.notes = order.notes.clone();
        stored.delivered_date = order.delivered_date;
        Ok(stored.clone())
    }

    async fn fetch_product(&self, product_id: Uuid) -> Result<ProductSummary, ServiceError> {
        self.products
            .get(&product_id)
            .map(|product| product.clone())
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    async fn search_products(&self, query: &str) -> Result<Vec<ProductSummary>, ServiceError> {
        let needle = query.to_lowercase();
        let mut hits: Vec<ProductSummary> = self
            .products
            .iter()
            .filter(|entry| entry.value().name.to_lowercase().contains(&needle))
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }

    async fn increment_coupon_usage(&self, code: &str) -> Result<(), ServiceError> {
        let mut coupon = self.coupons.get_mut(&code.to_uppercase()).ok_or_else(|| {
            ServiceError::NotFound(format!("Coupon {} not found", code))
        })?;
        coupon.usage_count += 1;
        Ok(())
    }
}
