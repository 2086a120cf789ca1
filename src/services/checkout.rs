use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use crate::{
    backend::StorefrontBackend,
    config::AppConfig,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        generate_order_number, regions, Address, CouponOutcome, CouponRejection, Order, OrderLine,
        OrderStatus, PaymentMethod,
    },
    services::{cart::CartStore, coupon::CouponValidator, pricing::PricingEngine},
};

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern compiles")
});

/// Result of attempting to apply a coupon code during checkout.
///
/// `AlreadyApplied` is informational, not an error: a cart holds at most
/// one coupon and a second code never silently replaces the first.
#[derive(Debug, Clone, PartialEq)]
pub enum CouponApplication {
    Applied { discount: Decimal },
    AlreadyApplied,
    Rejected(CouponRejection),
}

/// Result of placing an order.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// Online payment initiated; the order exists only after
    /// [`CheckoutOrchestrator::confirm_payment`].
    AwaitingPayment,
    /// Cash on delivery: the order was created immediately.
    Placed(Order),
}

/// Validates a shopper-entered address, reporting the first failing field.
///
/// Required, in order: full name, phone, email, address line 1, city,
/// state, postal code, country. Phone must be a 10-digit number; email must
/// match a standard address pattern. Validation stops at the first failure.
pub fn validate_address(form: &Address) -> Result<(), ServiceError> {
    let required: [(&str, &str); 8] = [
        ("full_name", &form.full_name),
        ("phone", &form.phone),
        ("email", &form.email),
        ("address_line1", &form.address_line1),
        ("city", &form.city),
        ("state", &form.state),
        ("postal_code", &form.postal_code),
        ("country", &form.country),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ServiceError::validation(field, "is required"));
        }
        match field {
            "phone" if !PHONE_PATTERN.is_match(value.trim()) => {
                return Err(ServiceError::validation(
                    "phone",
                    "must be a 10-digit number",
                ));
            }
            "email" if !EMAIL_PATTERN.is_match(value.trim()) => {
                return Err(ServiceError::validation(
                    "email",
                    "must be a valid email address",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Drives one checkout session: destination selection, coupon application,
/// pricing, and the two payment paths to a created order.
///
/// One orchestrator per checkout session; the coupon gate and pending
/// payment state do not survive into a new session.
pub struct CheckoutOrchestrator {
    backend: Arc<dyn StorefrontBackend>,
    cart: CartStore,
    pricing: PricingEngine,
    validator: CouponValidator,
    events: EventSender,
    home_country: String,

    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    payment_method: PaymentMethod,
    applied_coupon: Option<(String, Decimal)>,
    pending_draft: Option<Order>,
    placed_pending_clear: Option<Order>,
}

impl CheckoutOrchestrator {
    pub fn new(
        backend: Arc<dyn StorefrontBackend>,
        cart: CartStore,
        validator: CouponValidator,
        events: EventSender,
        config: &AppConfig,
    ) -> Self {
        Self {
            backend,
            cart,
            pricing: PricingEngine::new(config),
            validator,
            events,
            home_country: config.home_country.clone(),
            country: None,
            state: None,
            city: None,
            payment_method: PaymentMethod::PayNow,
            applied_coupon: None,
            pending_draft: None,
            placed_pending_clear: None,
        }
    }

    // ==================== Destination selection ====================

    pub fn selected_country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn selected_state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn selected_city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// States available for the currently selected country.
    pub fn available_states(&self) -> Vec<&'static str> {
        self.country
            .as_deref()
            .map(regions::states)
            .unwrap_or_default()
    }

    /// Cities available for the currently selected country and state.
    pub fn available_cities(&self) -> Vec<&'static str> {
        match (self.country.as_deref(), self.state.as_deref()) {
            (Some(country), Some(state)) => regions::cities(country, state),
            _ => Vec::new(),
        }
    }

    /// Selects the destination country. Changing country invalidates the
    /// dependent state and city selections, and silently falls back from
    /// cash on delivery to online payment when the destination leaves the
    /// home country.
    pub fn set_country(&mut self, country: &str) -> Result<(), ServiceError> {
        if !regions::is_known_country(country) {
            return Err(ServiceError::validation(
                "country",
                format!("'{}' is not a shippable country", country),
            ));
        }
        if self.country.as_deref() != Some(country) {
            self.state = None;
            self.city = None;
        }
        self.country = Some(country.to_string());

        if self.payment_method == PaymentMethod::CashOnDelivery && country != self.home_country {
            info!(
                "Destination moved outside {}, payment method reset to online payment",
                self.home_country
            );
            self.payment_method = PaymentMethod::PayNow;
        }
        Ok(())
    }

    /// Selects the destination state; must belong to the selected country.
    /// Changing state invalidates the city selection.
    pub fn set_state(&mut self, state: &str) -> Result<(), ServiceError> {
        let country = self.country.as_deref().ok_or_else(|| {
            ServiceError::validation("state", "select a country first")
        })?;
        if !regions::states(country).iter().any(|s| *s == state) {
            return Err(ServiceError::validation(
                "state",
                format!("'{}' is not a state of {}", state, country),
            ));
        }
        if self.state.as_deref() != Some(state) {
            self.city = None;
        }
        self.state = Some(state.to_string());
        Ok(())
    }

    /// Selects the destination city; must belong to the selected state.
    pub fn set_city(&mut self, city: &str) -> Result<(), ServiceError> {
        let (country, state) = match (self.country.as_deref(), self.state.as_deref()) {
            (Some(country), Some(state)) => (country, state),
            _ => {
                return Err(ServiceError::validation(
                    "city",
                    "select a country and state first",
                ))
            }
        };
        if !regions::cities(country, state).iter().any(|c| *c == city) {
            return Err(ServiceError::validation(
                "city",
                format!("'{}' is not a city of {}", city, state),
            ));
        }
        self.city = Some(city.to_string());
        Ok(())
    }

    // ==================== Payment method ====================

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Whether cash on delivery is legal for the selected destination.
    pub fn cod_allowed(&self) -> bool {
        self.country.as_deref() == Some(self.home_country.as_str())
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), ServiceError> {
        if method == PaymentMethod::CashOnDelivery && !self.cod_allowed() {
            return Err(ServiceError::InvalidOperation(format!(
                "Cash on delivery is only available for {}",
                self.home_country
            )));
        }
        self.payment_method = method;
        Ok(())
    }

    // ==================== Coupon ====================

    /// Applies a coupon code. One-shot per checkout session: once a coupon
    /// is applied, further codes report `AlreadyApplied` without replacing
    /// it.
    #[instrument(skip(self))]
    pub async fn apply_coupon(&mut self, code: &str) -> CouponApplication {
        if self.applied_coupon.is_some() {
            return CouponApplication::AlreadyApplied;
        }

        let subtotal = self.cart.total_price().await;
        match self.validator.validate(code, subtotal, Utc::now()) {
            CouponOutcome::Accepted { code, discount } => {
                self.applied_coupon = Some((code.clone(), discount));
                self.events
                    .send_or_log(Event::CouponApplied { code, discount })
                    .await;
                CouponApplication::Applied { discount }
            }
            CouponOutcome::Rejected(reason) => CouponApplication::Rejected(reason),
        }
    }

    pub fn applied_coupon(&self) -> Option<&str> {
        self.applied_coupon.as_ref().map(|(code, _)| code.as_str())
    }

    // ==================== Pricing ====================

    /// Price breakdown for the current cart and applied coupon. Pure over
    /// the snapshot; no network involved.
    pub async fn breakdown(&self) -> crate::models::PriceBreakdown {
        let subtotal = self.cart.total_price().await;
        let discount = self
            .applied_coupon
            .as_ref()
            .map(|(_, discount)| *discount)
            .unwrap_or(Decimal::ZERO);
        self.pricing.compute_from_subtotal(subtotal, discount)
    }

    // ==================== Order placement ====================

    /// Places the order for the given validated address.
    ///
    /// Cash on delivery creates the order immediately; online payment
    /// defers creation until [`confirm_payment`](Self::confirm_payment).
    /// If a previous placement created the order but failed to clear the
    /// cart, calling this again retries only the (idempotent) cart clear.
    #[instrument(skip(self, address))]
    pub async fn place_order(&mut self, address: Address) -> Result<CheckoutOutcome, ServiceError> {
        if let Some(order) = self.placed_pending_clear.take() {
            let order = self.finish_clear(order).await?;
            return Ok(CheckoutOutcome::Placed(order));
        }

        validate_address(&address)?;

        let snapshot = self.cart.snapshot().await;
        if snapshot.is_empty() {
            return Err(ServiceError::InvalidOperation("Cart is empty".to_string()));
        }
        if self.payment_method == PaymentMethod::CashOnDelivery
            && address.country != self.home_country
        {
            return Err(ServiceError::InvalidOperation(format!(
                "Cash on delivery is only available for {}",
                self.home_country
            )));
        }

        let discount = self
            .applied_coupon
            .as_ref()
            .map(|(_, discount)| *discount)
            .unwrap_or(Decimal::ZERO);
        let breakdown = self
            .pricing
            .compute_from_subtotal(snapshot.total_price(), discount);

        let items: Vec<OrderLine> = snapshot
            .lines()
            .iter()
            .map(|line| OrderLine {
                product_id: line.product_id,
                name: line.name.clone(),
                unit_price: line.unit_price,
                quantity: line.quantity,
                size: line.size.clone(),
                color: line.color.clone(),
                line_subtotal: line.line_subtotal,
            })
            .collect();

        let draft = Order {
            order_number: generate_order_number(),
            items,
            address,
            breakdown,
            payment_method: self.payment_method,
            coupon_code: self.applied_coupon.as_ref().map(|(code, _)| code.clone()),
            status: OrderStatus::Pending,
            notes: None,
            order_date: Utc::now(),
            delivered_date: None,
        };

        match self.payment_method {
            PaymentMethod::PayNow => {
                info!(
                    "Awaiting payment confirmation for order {}",
                    draft.order_number
                );
                self.pending_draft = Some(draft);
                Ok(CheckoutOutcome::AwaitingPayment)
            }
            PaymentMethod::CashOnDelivery => {
                let order = self.finalize(draft).await?;
                Ok(CheckoutOutcome::Placed(order))
            }
        }
    }

    /// Completes an online-payment checkout after the external payment
    /// confirmation event. Safe to call again when a previous attempt
    /// created the order but failed to clear the cart.
    #[instrument(skip(self))]
    pub async fn confirm_payment(&mut self) -> Result<Order, ServiceError> {
        if let Some(order) = self.placed_pending_clear.take() {
            return self.finish_clear(order).await;
        }
        let draft = self.pending_draft.take().ok_or_else(|| {
            ServiceError::InvalidOperation("No payment awaiting confirmation".to_string())
        })?;
        self.finalize(draft).await
    }

    /// Creates the order and clears the cart, in that order. Cart-clear is
    /// the last, idempotent, safely retriable step: a failure after order
    /// creation stashes the created order so a retry clears the cart
    /// without duplicating the order.
    async fn finalize(&mut self, draft: Order) -> Result<Order, ServiceError> {
        let order = match self.backend.create_order(draft.clone()).await {
            Ok(order) => order,
            Err(e) => {
                // Order does not exist yet; the draft stays retriable.
                if draft.payment_method == PaymentMethod::PayNow {
                    self.pending_draft = Some(draft);
                }
                return Err(e);
            }
        };

        // Usage is recorded at confirmed order creation for both payment
        // paths; a tracking failure never fails an order that exists.
        if let Some((code, _)) = &self.applied_coupon {
            if let Err(e) = self.backend.increment_coupon_usage(code).await {
                warn!("Failed to record coupon usage for {}: {}", code, e);
            }
        }

        self.events
            .send_or_log(Event::OrderCreated {
                order_number: order.order_number.clone(),
            })
            .await;

        self.finish_clear(order).await
    }

    async fn finish_clear(&mut self, order: Order) -> Result<Order, ServiceError> {
        if let Err(e) = self.cart.clear().await {
            warn!(
                "Order {} created but cart clear failed; retry placement to clear: {}",
                order.order_number, e
            );
            self.placed_pending_clear = Some(order);
            return Err(e);
        }
        self.events
            .send_or_log(Event::CheckoutCompleted {
                order_number: order.order_number.clone(),
            })
            .await;
        info!("Checkout completed: order {}", order.order_number);
        Ok(order)
    }
}
