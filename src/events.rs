use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::{errors::ServiceError, models::OrderStatus};

/// Domain events emitted by the storefront core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartRefreshed {
        total_items: u32,
    },
    CartLineAdded {
        product_id: Uuid,
    },
    CartLineUpdated {
        product_id: Uuid,
        quantity: i32,
    },
    CartLineRemoved {
        product_id: Uuid,
    },
    CartCleared,

    // Checkout events
    CouponApplied {
        code: String,
        discount: Decimal,
    },
    CheckoutCompleted {
        order_number: String,
    },

    // Order events
    OrderCreated {
        order_number: String,
    },
    OrderStatusChanged {
        order_number: String,
        old_status: OrderStatus,
        new_status: OrderStatus,
    },
    OrderCancelled {
        order_number: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, failing if the receiving side is gone.
    pub async fn send(&self, event: Event) -> Result<(), ServiceError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| ServiceError::EventError(format!("Failed to send event: {}", e)))
    }

    /// Sends an event, logging instead of failing when delivery is
    /// impossible. Event delivery is never allowed to fail a mutation that
    /// has already been applied.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropped domain event: {}", e);
        }
    }
}

/// Creates an event channel with the given buffer capacity.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}
