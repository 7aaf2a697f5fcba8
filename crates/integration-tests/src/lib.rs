//! Integration tests for the Gaming Store storefront.
//!
//! The tests drive the real [`ApiClient`](gaming_store_storefront::api::ApiClient)
//! against [`MockBackend`], an in-process `axum` server speaking the store
//! backend's JSON API on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p gaming-store-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog` - product listing, filters and caching
//! - `accounts` - login, registration and rejection bodies
//! - `checkout` - end-to-end cart and order flows

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use gaming_store_storefront::api::REQUEST_ID_HEADER;
use gaming_store_storefront::config::StorefrontConfig;

/// Password the mock accepts for every seeded account.
pub const VALID_PASSWORD: &str = "secret1";

/// Backend endpoints whose replies can be overridden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Games,
    Accessories,
    Login,
    Register,
    Orders,
}

/// Everything the mock received.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    /// Query parameters of each games request.
    pub games_queries: Vec<HashMap<String, String>>,
    /// Number of accessories requests.
    pub accessories_calls: usize,
    /// Login bodies.
    pub logins: Vec<Value>,
    /// Registration bodies.
    pub registrations: Vec<Value>,
    /// Order bodies.
    pub orders: Vec<Value>,
    /// `X-Request-Id` of every request, in arrival order.
    pub request_ids: Vec<String>,
}

#[derive(Default)]
struct MockState {
    recorded: Recorded,
    overrides: HashMap<Endpoint, (StatusCode, Value)>,
    next_order: u32,
}

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the store backend.
///
/// The server task is aborted when the value is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: SharedState,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port on localhost and start serving.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the listener cannot be bound.
    pub async fn start() -> std::io::Result<Self> {
        let state = SharedState::default();

        let app = Router::new()
            .route("/api/products/games", get(games))
            .route("/api/products/accessories", get(accessories))
            .route("/api/accounts/login", post(login))
            .route("/api/accounts/register", post(register))
            .route("/api/orders", post(create_order))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { addr, state, task })
    }

    /// API root, as a user would put in `STORE_API_BASE_URL`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Storefront configuration pointing at this backend.
    ///
    /// # Errors
    ///
    /// Returns the configuration error if the base URL is rejected.
    pub fn config(
        &self,
        data_dir: &Path,
    ) -> Result<StorefrontConfig, gaming_store_storefront::config::ConfigError> {
        StorefrontConfig::for_api(&self.base_url(), data_dir)
    }

    /// Answer every later request to `endpoint` with `status` and `body`.
    pub fn set_reply(&self, endpoint: Endpoint, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        lock(&self.state).overrides.insert(endpoint, (status, body));
    }

    /// Snapshot of what has been received so far.
    #[must_use]
    pub fn recorded(&self) -> Recorded {
        lock(&self.state).recorded.clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Seed data
// =============================================================================

fn seed_games() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "FIFA 2024", "price": 299, "category": "sports",
               "platform": ["PS5", "Xbox", "PC"], "rating": 4.5, "in_stock": true,
               "description": "The latest football simulation"}),
        json!({"id": 2, "name": "Call of Duty: Modern Warfare III", "price": 399,
               "category": "action", "platform": ["PS5", "Xbox", "PC"], "rating": 4.2,
               "in_stock": true, "description": "Intense first-person shooter"}),
        json!({"id": 4, "name": "Elden Ring", "price": 349, "category": "rpg",
               "platform": ["PS5", "Xbox", "PC"], "rating": 4.8, "in_stock": true,
               "description": "Open world action RPG"}),
        json!({"id": 5, "name": "Zelda: Tears of the Kingdom", "price": 299,
               "category": "adventure", "platform": ["Nintendo Switch"], "rating": 4.9,
               "in_stock": true, "description": "Epic adventure in Hyrule"}),
    ]
}

fn seed_accessories() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "DualSense Wireless Controller", "price": 250,
               "brand": "Sony", "platform": ["PS5"], "in_stock": true,
               "description": "Haptic feedback controller"}),
        json!({"id": 2, "name": "Gaming Headset Pro", "price": 180, "brand": "HyperX",
               "platform": ["PS5", "Xbox", "PC"], "in_stock": false,
               "description": "Surround sound headset"}),
    ]
}

fn seed_user(email: &str) -> Value {
    json!({"id": 7, "name": "Sara", "email": email, "phone": "0500000000"})
}

// =============================================================================
// Handlers
// =============================================================================

type Reply = (StatusCode, Json<Value>);

fn record_request(state: &mut MockState, headers: &HeaderMap) {
    if let Some(id) = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        state.recorded.request_ids.push(id.to_owned());
    }
}

fn overridden(state: &MockState, endpoint: Endpoint) -> Option<Reply> {
    state
        .overrides
        .get(&endpoint)
        .map(|(status, body)| (*status, Json(body.clone())))
}

async fn games(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    let mut state = lock(&state);
    record_request(&mut state, &headers);
    state.recorded.games_queries.push(params.clone());
    if let Some(reply) = overridden(&state, Endpoint::Games) {
        return reply;
    }

    let games: Vec<Value> = seed_games()
        .into_iter()
        .filter(|game| {
            params.get("category").is_none_or(|category| {
                game["category"]
                    .as_str()
                    .is_some_and(|c| c.eq_ignore_ascii_case(category))
            })
        })
        .filter(|game| {
            params.get("platform").is_none_or(|platform| {
                game["platform"]
                    .as_array()
                    .is_some_and(|p| p.iter().any(|v| v == platform.as_str()))
            })
        })
        .collect();

    (StatusCode::OK, Json(json!({"success": true, "games": games})))
}

async fn accessories(State(state): State<SharedState>, headers: HeaderMap) -> Reply {
    let mut state = lock(&state);
    record_request(&mut state, &headers);
    state.recorded.accessories_calls += 1;
    if let Some(reply) = overridden(&state, Endpoint::Accessories) {
        return reply;
    }

    (
        StatusCode::OK,
        Json(json!({"success": true, "accessories": seed_accessories()})),
    )
}

async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    record_request(&mut state, &headers);
    state.recorded.logins.push(body.clone());
    if let Some(reply) = overridden(&state, Endpoint::Login) {
        return reply;
    }

    if body["password"] == VALID_PASSWORD {
        let email = body["email"].as_str().unwrap_or_default();
        (
            StatusCode::OK,
            Json(json!({"success": true, "user": seed_user(email)})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid email or password"})),
        )
    }
}

async fn register(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    record_request(&mut state, &headers);
    state.recorded.registrations.push(body.clone());
    if let Some(reply) = overridden(&state, Endpoint::Register) {
        return reply;
    }

    let user = json!({
        "id": 8,
        "name": body["name"],
        "email": body["email"],
        "phone": body["phone"],
    });
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Account created", "user": user})),
    )
}

async fn create_order(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = lock(&state);
    record_request(&mut state, &headers);
    state.recorded.orders.push(body);
    if let Some(reply) = overridden(&state, Endpoint::Orders) {
        return reply;
    }

    state.next_order += 1;
    let order_number = format!("GO-{:06}", state.next_order);
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "order": {"order_number": order_number, "status": "pending"}
        })),
    )
}
