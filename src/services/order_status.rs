use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

use crate::{
    backend::StorefrontBackend,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Order, OrderStatus},
};

/// The single legal successor of a status, if any. `Delivered` and
/// `Cancelled` have none.
pub fn successor(status: OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::Pending => Some(OrderStatus::Confirmed),
        OrderStatus::Confirmed => Some(OrderStatus::Processing),
        OrderStatus::Processing => Some(OrderStatus::Packed),
        OrderStatus::Packed => Some(OrderStatus::Shipped),
        OrderStatus::Shipped => Some(OrderStatus::Delivered),
        OrderStatus::Delivered | OrderStatus::Cancelled => None,
    }
}

/// Whether an admin may still cancel an order in this status. Cancellation
/// closes once the order has shipped.
pub fn admin_cancellable(status: OrderStatus) -> bool {
    matches!(
        status,
        OrderStatus::Pending
            | OrderStatus::Confirmed
            | OrderStatus::Processing
            | OrderStatus::Packed
    )
}

/// Advances an order to `next`, which must be the single defined successor
/// of the current status. On failure the order is not mutated. `Delivered`
/// stamps `delivered_date`.
pub fn apply_advance(
    order: &mut Order,
    next: OrderStatus,
    notes: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if successor(order.status) != Some(next) {
        return Err(ServiceError::IllegalTransition {
            from: order.status,
            to: next,
        });
    }

    order.status = next;
    if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
        order.append_note(notes, now);
    }
    if next == OrderStatus::Delivered {
        order.delivered_date = Some(now);
    }
    Ok(())
}

/// Cancels an order on the shopper's behalf: legal only while the order is
/// still `Pending`, and a reason is required.
pub fn apply_shopper_cancel(
    order: &mut Order,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if reason.trim().is_empty() {
        return Err(ServiceError::validation(
            "reason",
            "A cancellation reason is required",
        ));
    }
    if order.status != OrderStatus::Pending {
        return Err(ServiceError::IllegalTransition {
            from: order.status,
            to: OrderStatus::Cancelled,
        });
    }
    cancel_with_note(order, reason, now);
    Ok(())
}

/// Cancels an order on the admin's behalf: legal from any pre-shipment
/// status.
pub fn apply_admin_cancel(
    order: &mut Order,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if !admin_cancellable(order.status) {
        return Err(ServiceError::IllegalTransition {
            from: order.status,
            to: OrderStatus::Cancelled,
        });
    }
    cancel_with_note(order, reason, now);
    Ok(())
}

fn cancel_with_note(order: &mut Order, reason: &str, now: DateTime<Utc>) {
    order.status = OrderStatus::Cancelled;
    order.append_note(&format!("CANCELLED: {}", reason), now);
}

/// Drives status transitions against the persistence boundary. Status
/// changes are the only mutation path for an existing order.
#[derive(Clone)]
pub struct OrderLifecycleService {
    backend: Arc<dyn StorefrontBackend>,
    events: EventSender,
}

impl OrderLifecycleService {
    pub fn new(backend: Arc<dyn StorefrontBackend>, events: EventSender) -> Self {
        Self { backend, events }
    }

    /// Admin-initiated advance to the next status.
    #[instrument(skip(self), fields(order_number = %order_number, next = %next))]
    pub async fn advance(
        &self,
        order_number: &str,
        next: OrderStatus,
        notes: Option<&str>,
    ) -> Result<Order, ServiceError> {
        let mut order = self.backend.fetch_order_by_number(order_number).await?;
        let old_status = order.status;

        if let Err(e) = apply_advance(&mut order, next, notes, Utc::now()) {
            error!("Rejected status change for {}: {}", order_number, e);
            return Err(e);
        }

        let updated = self.backend.update_order_status(&order).await?;
        self.events
            .send_or_log(Event::OrderStatusChanged {
                order_number: order_number.to_string(),
                old_status,
                new_status: next,
            })
            .await;
        info!(
            "Order {} status updated from '{}' to '{}'",
            order_number, old_status, next
        );
        Ok(updated)
    }

    /// Shopper-initiated cancellation; only pending orders qualify.
    #[instrument(skip(self), fields(order_number = %order_number))]
    pub async fn cancel(&self, order_number: &str, reason: &str) -> Result<Order, ServiceError> {
        let mut order = self.backend.fetch_order_by_number(order_number).await?;
        apply_shopper_cancel(&mut order, reason, Utc::now())?;

        let updated = self.backend.update_order_status(&order).await?;
        self.events
            .send_or_log(Event::OrderCancelled {
                order_number: order_number.to_string(),
                reason: reason.to_string(),
            })
            .await;
        info!("Order {} cancelled: {}", order_number, reason);
        Ok(updated)
    }

    /// Admin-initiated cancellation; legal until the order ships.
    #[instrument(skip(self), fields(order_number = %order_number))]
    pub async fn admin_cancel(
        &self,
        order_number: &str,
        reason: &str,
    ) -> Result<Order, ServiceError> {
        let mut order = self.backend.fetch_order_by_number(order_number).await?;
        apply_admin_cancel(&mut order, reason, Utc::now())?;

        let updated = self.backend.update_order_status(&order).await?;
        self.events
            .send_or_log(Event::OrderCancelled {
                order_number: order_number.to_string(),
                reason: reason.to_string(),
            })
            .await;
        Ok(updated)
    }
}
