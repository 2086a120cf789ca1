use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    backend::StorefrontBackend,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{Cart, CartLine, LineKey},
    session::{AuthSession, AuthState},
};

/// Authoritative in-memory cart for the current session.
///
/// The store is never ahead of the server: every mutation is a backend
/// write followed by a [`refresh`](CartStore::refresh), and a failed write
/// leaves the local snapshot untouched. Derived totals are therefore never
/// stale relative to the last completed server write. An unauthenticated
/// session always observes an empty cart; no anonymous cart survives a
/// login boundary.
#[derive(Clone)]
pub struct CartStore {
    backend: Arc<dyn StorefrontBackend>,
    auth: watch::Receiver<AuthState>,
    snapshot: Arc<RwLock<Cart>>,
    events: EventSender,
}

impl CartStore {
    pub fn new(
        backend: Arc<dyn StorefrontBackend>,
        session: &AuthSession,
        events: EventSender,
    ) -> Self {
        Self {
            backend,
            auth: session.state(),
            snapshot: Arc::new(RwLock::new(Cart::empty())),
            events,
        }
    }

    /// Spawns a task that refreshes the store on every session-boundary
    /// change (login, logout, storage change from another context).
    pub fn spawn_session_listener(&self, session: &AuthSession) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        let mut rx = session.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        info!(?event, "Session change observed, refreshing cart");
                        if let Err(e) = store.refresh().await {
                            tracing::warn!("Cart refresh after session change failed: {}", e);
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {
                        // Missed notifications collapse into one refresh.
                        if let Err(e) = store.refresh().await {
                            tracing::warn!("Cart refresh after lag failed: {}", e);
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn customer_id(&self) -> Result<Uuid, ServiceError> {
        match *self.auth.borrow() {
            AuthState::Authenticated { customer_id } => Ok(customer_id),
            AuthState::Anonymous => Err(ServiceError::Unauthenticated(
                "Sign in to modify the cart".to_string(),
            )),
        }
    }

    /// Replaces the local snapshot with the server-side cart; forced empty
    /// when the session is unauthenticated. The last refresh to resolve
    /// wins.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), ServiceError> {
        let state = self.auth.borrow().clone();
        let cart = match state {
            AuthState::Anonymous => Cart::empty(),
            AuthState::Authenticated { customer_id } => {
                self.backend.fetch_cart(customer_id).await?
            }
        };
        let total_items = cart.total_items();
        *self.snapshot.write().await = cart;
        self.events
            .send_or_log(Event::CartRefreshed { total_items })
            .await;
        Ok(())
    }

    /// Adds `quantity` of an item, merging with an existing line of the
    /// same identity key. Requires an authenticated session.
    #[instrument(skip(self, item))]
    pub async fn add(&self, item: CartLine, quantity: u32) -> Result<(), ServiceError> {
        let customer_id = self.customer_id()?;
        let mut line = item;
        line.set_quantity(quantity.max(1));
        let product_id = line.product_id;

        self.backend.add_cart_line(customer_id, line).await?;
        self.events
            .send_or_log(Event::CartLineAdded { product_id })
            .await;
        self.refresh().await
    }

    /// Sets a line's quantity. A quantity of zero or less removes the line;
    /// this collapsed operation is deliberate and load-bearing.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, key: &LineKey, quantity: i32) -> Result<(), ServiceError> {
        let customer_id = self.customer_id()?;
        self.backend
            .update_cart_line(customer_id, key, quantity)
            .await?;
        self.events
            .send_or_log(Event::CartLineUpdated {
                product_id: key.product_id,
                quantity,
            })
            .await;
        self.refresh().await
    }

    /// Removes a line; removing an absent line is a no-op.
    #[instrument(skip(self))]
    pub async fn remove(&self, key: &LineKey) -> Result<(), ServiceError> {
        let customer_id = self.customer_id()?;
        self.backend.remove_cart_line(customer_id, key).await?;
        self.events
            .send_or_log(Event::CartLineRemoved {
                product_id: key.product_id,
            })
            .await;
        self.refresh().await
    }

    /// Empties the cart. Idempotent.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ServiceError> {
        let customer_id = self.customer_id()?;
        self.backend.clear_cart(customer_id).await?;
        self.events.send_or_log(Event::CartCleared).await;
        self.refresh().await
    }

    /// Read-only snapshot of the current cart.
    pub async fn snapshot(&self) -> Cart {
        self.snapshot.read().await.clone()
    }

    /// Sum of quantities in the current snapshot.
    pub async fn total_items(&self) -> u32 {
        self.snapshot.read().await.total_items()
    }

    /// Sum of line subtotals in the current snapshot.
    pub async fn total_price(&self) -> rust_decimal::Decimal {
        self.snapshot.read().await.total_price()
    }
}
