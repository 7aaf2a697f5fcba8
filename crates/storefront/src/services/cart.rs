//! Cart store and checkout.
//!
//! The cart is a single [`CartStore`] owned by the session and handed to UI
//! code by reference. Every mutation recomputes the total from the line
//! items, writes the snapshot to durable storage and publishes a
//! [`CartSummary`] to subscribers.
//!
//! # Checkout
//!
//! ```text
//! Idle -> [guard, non-empty, signed in] -> Submitting
//!      -> Succeeded -> Idle (empty cart)
//!      -> Failed    -> Idle (cart unchanged)
//! ```
//!
//! Each attempt sends at most one request and is never retried; the user
//! decides whether to try again.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use gaming_store_core::{LineItem, Price, UserIdentity};

use crate::api::{ApiClient, ApiError, CustomerInfo, OrderRequest, OrderResponse};
use crate::error::add_breadcrumb;
use crate::storage::{KeyValueStore, StorageError, keys};

/// Message used when the order service declines without saying why.
const DEFAULT_REJECTION: &str = "The order was not accepted";

/// Message used when the order service accepts without a message.
const DEFAULT_CONFIRMATION: &str = "Thank you! We will contact you shortly to complete your order.";

// =============================================================================
// Order Service
// =============================================================================

/// Backend that accepts finalized orders.
pub trait OrderService: Send + Sync {
    /// Submit `order` once.
    fn submit_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<OrderResponse, ApiError>> + Send;
}

impl OrderService for ApiClient {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
        Self::submit_order(self, order).await
    }
}

// =============================================================================
// State
// =============================================================================

/// Cart contents with a total derived from the items.
///
/// Fields are private: the only way to change the items also recomputes
/// the total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    items: Vec<LineItem>,
    total: Price,
}

impl CartState {
    fn from_items(items: Vec<LineItem>) -> Self {
        let total = items.iter().map(LineItem::line_total).sum();
        Self { items, total }
    }

    /// Line items in first-add order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Sum of unit price times quantity over all items.
    #[must_use]
    pub const fn total(&self) -> Price {
        self.total
    }

    /// Number of distinct line items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of units across all line items.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Summary published to observers.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.item_count(),
            unit_count: self.unit_count(),
            total: self.total,
        }
    }

    /// Add one unit of `candidate`, merging with an existing line for the
    /// same (`id`, `type`).
    fn add_one(&mut self, candidate: LineItem) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.same_product(&candidate))
        {
            existing.quantity = existing.quantity.saturating_add(1);
        } else {
            self.items.push(LineItem {
                quantity: 1,
                ..candidate
            });
        }
        self.total = self.items.iter().map(LineItem::line_total).sum();
    }
}

/// What the UI shows next to the cart icon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartSummary {
    /// Distinct line items (the badge count).
    pub item_count: usize,
    /// Units across all lines.
    pub unit_count: u64,
    /// Cart total.
    pub total: Price,
}

// =============================================================================
// Errors
// =============================================================================

/// Reasons a checkout attempt can fail. The cart is unchanged in every case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// No signed-in user; the UI should send the user to login.
    #[error("sign in to place an order")]
    NotAuthenticated,

    /// Another checkout has not finished yet.
    #[error("a checkout is already in progress")]
    InProgress,

    /// The order service declined the order.
    #[error("order rejected: {0}")]
    OrderRejected(String),

    /// The order service could not be reached or answered garbage.
    #[error("order service unavailable: {0}")]
    Transport(#[from] ApiError),
}

/// Reasons a persisted cart snapshot is discarded.
#[derive(Debug, Error)]
enum SnapshotError {
    #[error("unreadable: {0}")]
    Storage(#[from] StorageError),

    #[error("malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("item {0} has zero quantity")]
    ZeroQuantity(String),

    #[error("item {0} appears more than once")]
    Duplicate(String),
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Message from the order service.
    pub message: String,
    /// Service-assigned order number, when provided.
    pub order_number: Option<String>,
    /// Total that was submitted.
    pub total: Price,
    /// Number of line items submitted.
    pub item_count: usize,
    /// When the acknowledgment was received.
    pub placed_at: DateTime<Utc>,
}

// =============================================================================
// CartStore
// =============================================================================

/// The session's cart.
///
/// Cheap to clone; clones share state. All mutations are serialized by an
/// internal lock that is never held across an await point.
pub struct CartStore<S> {
    inner: Arc<CartStoreInner<S>>,
}

struct CartStoreInner<S> {
    storage: Arc<S>,
    state: Mutex<CartState>,
    submitting: AtomicBool,
    summary_tx: watch::Sender<CartSummary>,
}

impl<S> Clone for CartStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the submission flag when a checkout attempt ends, however it ends.
struct SubmissionGuard<'a>(&'a AtomicBool);

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create an empty cart backed by `storage`. Nothing is read or written.
    #[must_use]
    pub fn new(storage: Arc<S>) -> Self {
        let (summary_tx, _) = watch::channel(CartSummary::default());
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                state: Mutex::new(CartState::default()),
                submitting: AtomicBool::new(false),
                summary_tx,
            }),
        }
    }

    /// Create a cart and rehydrate it from `storage`.
    #[must_use]
    pub fn open(storage: Arc<S>) -> Self {
        let store = Self::new(storage);
        store.load_persisted();
        store
    }

    fn lock_state(&self) -> MutexGuard<'_, CartState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the persisted snapshot with the persisted items.
    ///
    /// A failed write is logged; the in-memory cart stays authoritative.
    fn persist(&self, state: &CartState) {
        let result = serde_json::to_string(&state.items)
            .map_err(|e| e.to_string())
            .and_then(|items| {
                self.inner
                    .storage
                    .set(keys::CART_ITEMS, &items)
                    .and_then(|()| {
                        self.inner
                            .storage
                            .set(keys::CART_TOTAL, &state.total.amount().to_string())
                    })
                    .map_err(|e| e.to_string())
            });

        if let Err(error) = result {
            warn!(%error, "Failed to persist cart snapshot");
        }
    }

    fn publish(&self, state: &CartState) {
        self.inner.summary_tx.send_replace(state.summary());
    }

    fn read_snapshot(&self) -> Result<Option<CartState>, SnapshotError> {
        let Some(raw) = self.inner.storage.get(keys::CART_ITEMS)? else {
            return Ok(None);
        };

        let items: Vec<LineItem> = serde_json::from_str(&raw)?;

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(SnapshotError::ZeroQuantity(item.id.to_string()));
            }
            if !seen.insert((item.kind, &item.id)) {
                return Err(SnapshotError::Duplicate(item.id.to_string()));
            }
        }

        let state = CartState::from_items(items);

        if let Ok(Some(stored_total)) = self.inner.storage.get(keys::CART_TOTAL)
            && stored_total.trim().parse::<u64>().ok() != Some(state.total.amount())
        {
            debug!(
                stored = %stored_total.trim(),
                recomputed = %state.total,
                "Ignoring stale persisted cart total"
            );
        }

        Ok(Some(state))
    }

    /// Rehydrate the cart from durable storage.
    ///
    /// The total is recomputed from the items; the stored total is never
    /// trusted. A missing snapshot yields an empty cart, and so does a
    /// corrupt one (which is then overwritten).
    #[instrument(skip(self))]
    pub fn load_persisted(&self) -> CartState {
        let state = match self.read_snapshot() {
            Ok(Some(state)) => {
                debug!(items = state.item_count(), total = %state.total, "Restored cart");
                state
            }
            Ok(None) => CartState::default(),
            Err(error) => {
                warn!(%error, "Discarding corrupt cart snapshot");
                let empty = CartState::default();
                self.persist(&empty);
                empty
            }
        };

        *self.lock_state() = state.clone();
        self.publish(&state);
        state
    }

    /// Add one unit of `candidate` to the cart.
    ///
    /// The caller's quantity is ignored: each add contributes exactly one
    /// unit. Always succeeds.
    #[instrument(skip(self, candidate), fields(id = %candidate.id, kind = %candidate.kind))]
    pub fn add_item(&self, candidate: LineItem) -> CartState {
        let name = candidate.name.clone();
        let state = {
            let mut state = self.lock_state();
            state.add_one(candidate);
            self.persist(&state);
            state.clone()
        };
        self.publish(&state);

        add_breadcrumb("cart", "Added item to cart", Some(&[("name", name.as_str())]));
        debug!(items = state.item_count(), total = %state.total, "Cart updated");
        state
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) -> CartState {
        self.replace_state(CartState::default())
    }

    fn replace_state(&self, new_state: CartState) -> CartState {
        {
            let mut state = self.lock_state();
            *state = new_state.clone();
            self.persist(&state);
        }
        self.publish(&new_state);
        new_state
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn state(&self) -> CartState {
        self.lock_state().clone()
    }

    /// Current count and total.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.lock_state().summary()
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_state().is_empty()
    }

    /// Register an observer of count and total changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.inner.summary_tx.subscribe()
    }

    /// Whether a checkout is currently awaiting the order service.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.inner.submitting.load(Ordering::Acquire)
    }

    /// Submit the cart as an order for `identity`.
    ///
    /// On acceptance the cart is emptied and the empty snapshot persisted.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::InProgress` if another checkout has not finished
    /// - `CheckoutError::EmptyCart` if there is nothing to order
    /// - `CheckoutError::NotAuthenticated` if `identity` is `None`
    /// - `CheckoutError::OrderRejected` if the service answers `success: false`
    /// - `CheckoutError::Transport` on network, status or decoding failures
    ///
    /// Only the last two involve a request, and none of them change the cart.
    #[instrument(skip_all)]
    pub async fn checkout<O: OrderService>(
        &self,
        identity: Option<&UserIdentity>,
        orders: &O,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let _guard =
            SubmissionGuard::acquire(&self.inner.submitting).ok_or(CheckoutError::InProgress)?;

        let snapshot = self.state();
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let Some(identity) = identity else {
            return Err(CheckoutError::NotAuthenticated);
        };

        let order = OrderRequest {
            user_id: identity.id.clone(),
            items: snapshot.items.clone(),
            total: snapshot.total,
            customer_info: CustomerInfo {
                name: identity.name.clone(),
                email: identity.email.clone(),
                phone: identity.phone.clone(),
            },
        };

        let response = orders.submit_order(&order).await.map_err(|error| {
            warn!(%error, "Order submission failed");
            CheckoutError::Transport(error)
        })?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
            info!(%message, "Order rejected by service");
            return Err(CheckoutError::OrderRejected(message));
        }

        self.replace_state(CartState::default());

        let confirmation = OrderConfirmation {
            message: response
                .message
                .unwrap_or_else(|| DEFAULT_CONFIRMATION.to_string()),
            order_number: response.order.and_then(|order| order.order_number),
            total: order.total,
            item_count: order.items.len(),
            placed_at: Utc::now(),
        };

        info!(
            order_number = confirmation.order_number.as_deref().unwrap_or("-"),
            total = %confirmation.total,
            "Order placed"
        );
        Ok(confirmation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use gaming_store_core::{ProductType, UserId};
    use tokio::sync::Notify;

    use super::*;
    use crate::api::OrderRecord;
    use crate::storage::{FileStore, MemoryStore};

    // =========================================================================
    // Fakes
    // =========================================================================

    enum Outcome {
        Accept,
        Reject(Option<&'static str>),
        Unavailable,
    }

    struct FakeOrders {
        outcome: Outcome,
        calls: AtomicUsize,
        last_order: Mutex<Option<OrderRequest>>,
    }

    impl FakeOrders {
        fn new(outcome: Outcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                last_order: Mutex::new(None),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl OrderService for FakeOrders {
        async fn submit_order(&self, order: &OrderRequest) -> Result<OrderResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_order.lock().unwrap() = Some(order.clone());
            match self.outcome {
                Outcome::Accept => Ok(OrderResponse {
                    success: true,
                    message: Some("Order created successfully".to_string()),
                    order: Some(OrderRecord {
                        order_number: Some("GO-000001".to_string()),
                        status: Some("pending".to_string()),
                    }),
                }),
                Outcome::Reject(message) => Ok(OrderResponse {
                    success: false,
                    message: message.map(str::to_string),
                    order: None,
                }),
                Outcome::Unavailable => Err(ApiError::Status {
                    status: 503,
                    body: "maintenance".to_string(),
                }),
            }
        }
    }

    /// Order service that blocks until released.
    struct GatedOrders {
        gate: Notify,
        calls: AtomicUsize,
    }

    impl OrderService for GatedOrders {
        async fn submit_order(&self, _order: &OrderRequest) -> Result<OrderResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(OrderResponse {
                success: true,
                message: None,
                order: None,
            })
        }
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn game_a() -> LineItem {
        LineItem::new("g1", ProductType::Game, "Game A", Price::new(150))
    }

    fn pad() -> LineItem {
        LineItem::new("a1", ProductType::Accessory, "Pad", Price::new(80))
    }

    fn identity() -> UserIdentity {
        UserIdentity {
            id: UserId::new("7"),
            name: "Sara".to_string(),
            email: "sara@example.com".to_string(),
            phone: "0500000000".to_string(),
        }
    }

    fn store() -> (Arc<MemoryStore>, CartStore<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (Arc::clone(&storage), CartStore::new(storage))
    }

    fn recomputed_total(state: &CartState) -> u64 {
        state
            .items()
            .iter()
            .map(|item| item.price.amount() * u64::from(item.quantity))
            .sum()
    }

    // =========================================================================
    // add_item
    // =========================================================================

    #[test]
    fn test_same_product_twice_increments_quantity() {
        let (_, cart) = store();
        cart.add_item(game_a());
        let state = cart.add_item(game_a());

        assert_eq!(state.item_count(), 1);
        assert_eq!(state.items()[0].quantity, 2);
        assert_eq!(state.total(), Price::new(300));
    }

    #[test]
    fn test_same_id_different_type_is_distinct() {
        let (_, cart) = store();
        cart.add_item(LineItem::new("1", ProductType::Game, "FIFA 2024", Price::new(299)));
        let state = cart.add_item(LineItem::new(
            "1",
            ProductType::Accessory,
            "Controller",
            Price::new(250),
        ));

        assert_eq!(state.item_count(), 2);
        assert_eq!(state.items()[0].kind, ProductType::Game);
        assert_eq!(state.items()[1].kind, ProductType::Accessory);
        assert_eq!(state.total(), Price::new(549));
    }

    #[test]
    fn test_items_keep_first_add_order() {
        let (_, cart) = store();
        cart.add_item(pad());
        cart.add_item(game_a());
        let state = cart.add_item(pad());

        let ids: Vec<_> = state.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a1", "g1"]);
    }

    #[test]
    fn test_caller_quantity_is_ignored() {
        let (_, cart) = store();
        let mut candidate = game_a();
        candidate.quantity = 5;
        let state = cart.add_item(candidate);

        assert_eq!(state.items()[0].quantity, 1);
        assert_eq!(state.total(), Price::new(150));
    }

    #[test]
    fn test_total_matches_recomputation_for_any_sequence() {
        let catalog = [
            LineItem::new("1", ProductType::Game, "FIFA 2024", Price::new(299)),
            LineItem::new("2", ProductType::Game, "Call of Duty", Price::new(399)),
            LineItem::new("1", ProductType::Accessory, "Controller", Price::new(250)),
            LineItem::new("3", ProductType::Accessory, "Headset", Price::new(0)),
            LineItem::new("4", ProductType::Game, "Elden Ring", Price::new(349)),
        ];

        // Deterministic pseudo-random sequence of adds.
        let mut seed: u32 = 0x2545_f491;
        let (_, cart) = store();
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let pick = (seed >> 16) as usize % catalog.len();
            let state = cart.add_item(catalog[pick].clone());

            assert_eq!(state.total().amount(), recomputed_total(&state));
            let mut keys: Vec<_> = state.items().iter().map(|i| (i.kind, &i.id)).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), state.item_count());
        }
        assert_eq!(cart.state().unit_count(), 200);
    }

    #[test]
    fn test_add_persists_snapshot() {
        let (storage, cart) = store();
        cart.add_item(game_a());
        cart.add_item(game_a());

        let items: Vec<LineItem> =
            serde_json::from_str(&storage.get(keys::CART_ITEMS).unwrap().unwrap()).unwrap();
        assert_eq!(items[0].quantity, 2);
        assert_eq!(storage.get(keys::CART_TOTAL).unwrap().as_deref(), Some("300"));
    }

    #[test]
    fn test_add_succeeds_when_storage_write_fails() {
        let cart = CartStore::new(Arc::new(ReadOnlyStore));
        let state = cart.add_item(game_a());
        assert_eq!(state.total(), Price::new(150));
        assert_eq!(cart.summary().item_count, 1);
    }

    #[test]
    fn test_observers_see_count_and_total() {
        let (_, cart) = store();
        let mut rx = cart.subscribe();

        cart.add_item(game_a());
        cart.add_item(pad());

        assert!(rx.has_changed().unwrap());
        let summary = *rx.borrow_and_update();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.unit_count, 2);
        assert_eq!(summary.total, Price::new(230));
    }

    #[test]
    fn test_clear() {
        let (storage, cart) = store();
        cart.add_item(game_a());
        let state = cart.clear();

        assert!(state.is_empty());
        assert_eq!(state.total(), Price::ZERO);
        assert_eq!(storage.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get(keys::CART_TOTAL).unwrap().as_deref(), Some("0"));
    }

    // =========================================================================
    // load_persisted
    // =========================================================================

    #[test]
    fn test_persist_then_load_round_trips() {
        let (storage, cart) = store();
        cart.add_item(game_a());
        cart.add_item(game_a());
        cart.add_item(pad());
        let before = cart.state();

        let reloaded = CartStore::open(storage);
        assert_eq!(reloaded.state(), before);
        assert_eq!(reloaded.state().total(), Price::new(380));
    }

    #[test]
    fn test_load_recomputes_total_ignoring_stored_value() {
        let items = serde_json::to_string(&[game_a()]).unwrap();
        let storage = Arc::new(MemoryStore::with_entries([
            (keys::CART_ITEMS, items.as_str()),
            (keys::CART_TOTAL, "9999"),
        ]));

        let cart = CartStore::new(storage);
        let state = cart.load_persisted();
        assert_eq!(state.total(), Price::new(150));
        assert_eq!(cart.summary().total, Price::new(150));
    }

    #[test]
    fn test_load_without_snapshot_is_empty() {
        let (_, cart) = store();
        assert!(cart.load_persisted().is_empty());
    }

    #[test]
    fn test_load_corrupt_snapshot_yields_empty_cart() {
        for corrupt in [
            "{not json",
            r#"{"items": []}"#,
            r#"[{"id": "g1", "name": "Game A"}]"#,
            r#"[{"id": "g1", "name": "A", "price": -1, "quantity": 1, "type": "game"}]"#,
            r#"[{"id": "g1", "name": "A", "price": 1, "quantity": 1, "type": "console"}]"#,
            r#"[{"id": "g1", "name": "A", "price": 1, "quantity": 0, "type": "game"}]"#,
            r#"[{"id": "g1", "name": "A", "price": 1, "quantity": 1, "type": "game"},
                {"id": "g1", "name": "A", "price": 1, "quantity": 2, "type": "game"}]"#,
        ] {
            let storage = Arc::new(MemoryStore::with_entries([(keys::CART_ITEMS, corrupt)]));
            let cart = CartStore::new(Arc::clone(&storage));

            let state = cart.load_persisted();
            assert!(state.is_empty(), "expected empty cart for {corrupt}");
            assert_eq!(
                storage.get(keys::CART_ITEMS).unwrap().as_deref(),
                Some("[]")
            );
        }
    }

    #[test]
    fn test_file_backed_cart_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let cart = CartStore::open(Arc::new(FileStore::new(dir.path())));
        cart.add_item(game_a());
        cart.add_item(pad());

        let restarted = CartStore::open(Arc::new(FileStore::new(dir.path())));
        assert_eq!(restarted.state().item_count(), 2);
        assert_eq!(restarted.state().total(), Price::new(230));
    }

    // =========================================================================
    // checkout
    // =========================================================================

    #[tokio::test]
    async fn test_checkout_empty_cart_makes_no_request() {
        let (_, cart) = store();
        let orders = FakeOrders::new(Outcome::Accept);

        let err = cart.checkout(Some(&identity()), &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(orders.calls(), 0);
    }

    #[tokio::test]
    async fn test_checkout_without_identity_makes_no_request() {
        let (_, cart) = store();
        cart.add_item(game_a());
        let orders = FakeOrders::new(Outcome::Accept);

        let err = cart.checkout(None, &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(orders.calls(), 0);
        assert_eq!(cart.state().total(), Price::new(150));
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let (storage, cart) = store();
        cart.add_item(game_a());
        cart.add_item(game_a());
        cart.add_item(pad());
        let orders = FakeOrders::new(Outcome::Accept);

        let confirmation = cart.checkout(Some(&identity()), &orders).await.unwrap();

        assert_eq!(confirmation.total, Price::new(380));
        assert_eq!(confirmation.item_count, 2);
        assert_eq!(confirmation.order_number.as_deref(), Some("GO-000001"));
        assert_eq!(confirmation.message, "Order created successfully");
        assert!(cart.is_empty());
        assert_eq!(cart.state().total(), Price::ZERO);
        assert_eq!(storage.get(keys::CART_ITEMS).unwrap().as_deref(), Some("[]"));
        assert!(!cart.is_submitting());
    }

    #[tokio::test]
    async fn test_checkout_sends_full_payload() {
        let (_, cart) = store();
        cart.add_item(game_a());
        cart.add_item(pad());
        cart.add_item(game_a());
        let orders = FakeOrders::new(Outcome::Accept);

        cart.checkout(Some(&identity()), &orders).await.unwrap();

        let order = orders.last_order.lock().unwrap().clone().unwrap();
        assert_eq!(order.user_id, UserId::new("7"));
        assert_eq!(order.total, Price::new(380));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[1].kind, ProductType::Accessory);
        assert_eq!(
            order.customer_info,
            CustomerInfo {
                name: "Sara".to_string(),
                email: "sara@example.com".to_string(),
                phone: "0500000000".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_checkout_rejection_keeps_cart() {
        let (_, cart) = store();
        cart.add_item(game_a());
        let before = cart.state();
        let orders = FakeOrders::new(Outcome::Reject(Some("X")));

        let err = cart.checkout(Some(&identity()), &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderRejected(ref m) if m == "X"));
        assert_eq!(cart.state(), before);
        assert_eq!(orders.calls(), 1);
    }

    #[tokio::test]
    async fn test_checkout_rejection_without_message() {
        let (_, cart) = store();
        cart.add_item(game_a());
        let orders = FakeOrders::new(Outcome::Reject(None));

        let err = cart.checkout(Some(&identity()), &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderRejected(ref m) if m == DEFAULT_REJECTION));
    }

    #[tokio::test]
    async fn test_checkout_transport_failure_keeps_cart_and_does_not_retry() {
        let (_, cart) = store();
        cart.add_item(pad());
        let before = cart.state();
        let orders = FakeOrders::new(Outcome::Unavailable);

        let err = cart.checkout(Some(&identity()), &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::Transport(ApiError::Status { status: 503, .. })));
        assert_eq!(cart.state(), before);
        assert_eq!(orders.calls(), 1);
        assert!(!cart.is_submitting());
    }

    #[tokio::test]
    async fn test_concurrent_checkout_is_rejected() {
        let (_, cart) = store();
        cart.add_item(game_a());
        let orders = GatedOrders {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
        };
        let user = identity();

        let first = cart.checkout(Some(&user), &orders);
        let second = async {
            tokio::task::yield_now().await;
            assert!(cart.is_submitting());
            let result = cart.checkout(Some(&user), &orders).await;
            orders.gate.notify_one();
            result
        };

        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second, Err(CheckoutError::InProgress)));
        assert_eq!(orders.calls.load(Ordering::SeqCst), 1);
        assert!(cart.is_empty());
        assert!(!cart.is_submitting());
    }

    #[tokio::test]
    async fn test_example_scenario() {
        let (_, cart) = store();
        let orders = FakeOrders::new(Outcome::Accept);

        assert_eq!(cart.add_item(game_a()).total(), Price::new(150));
        assert_eq!(cart.add_item(game_a()).total(), Price::new(300));
        assert_eq!(cart.add_item(pad()).total(), Price::new(380));

        let err = cart.checkout(None, &orders).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NotAuthenticated));
        assert_eq!(cart.state().total(), Price::new(380));

        cart.checkout(Some(&identity()), &orders).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.summary(), CartSummary::default());
    }
}
