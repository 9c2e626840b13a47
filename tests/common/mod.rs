// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake of the analytics backend.
//!
//! Serves the same routes as the real server on an ephemeral port and
//! records what the client sent so tests can assert on it.

use axum::{
    extract::{Multipart, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use equipdash::config::Config;
use equipdash::models::{Session, User};
use equipdash::store::{CredentialStore, MemoryCredentialStore};
use equipdash::ApiClient;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Number of uploads the fake history endpoint pretends to hold.
#[allow(dead_code)]
pub const HISTORY_TOTAL: usize = 12;

/// Mutable backend state shared with the test.
#[derive(Debug, Default)]
pub struct BackendState {
    /// Access token the protected routes accept
    pub valid_access: Option<String>,
    /// Refresh token the refresh route accepts
    pub valid_refresh: Option<String>,
    /// Access token handed out by the next successful refresh
    pub next_access: String,
    /// Reject every protected request regardless of token
    pub reject_all: bool,
    /// Authorization header of every protected request, in order
    pub protected_auth: Vec<Option<String>>,
    /// Authorization header of every refresh request, in order
    pub refresh_auth: Vec<Option<String>>,
    pub login_calls: usize,
    pub logout_calls: usize,
    /// (field name, filename, bytes) of each upload received
    pub uploads: Vec<(String, String, Vec<u8>)>,
}

#[allow(dead_code)]
impl BackendState {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_auth.len()
    }
}

pub type Shared = Arc<Mutex<BackendState>>;

/// A running fake backend.
pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Start the fake on 127.0.0.1 with an ephemeral port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            next_access: "A2".to_string(),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/api/app1/token/", post(login))
            .route("/api/app1/token/refresh/", post(refresh))
            .route("/api/signup/", post(signup))
            .route("/api/web/upload", post(upload))
            .route("/api/get-history/", get(history))
            .route("/api/auth/me/", get(me))
            .route("/api/auth/logout/", post(logout))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    pub fn config(&self) -> Config {
        Config::test_default(&self.base_url)
    }

    /// Client over a fresh in-memory store.
    pub fn client(&self) -> (ApiClient, Arc<MemoryCredentialStore>) {
        self.client_with(MemoryCredentialStore::new())
    }

    pub fn client_with(
        &self,
        store: MemoryCredentialStore,
    ) -> (ApiClient, Arc<MemoryCredentialStore>) {
        let store = Arc::new(store);
        let dyn_store: Arc<dyn CredentialStore> = store.clone();
        let client = ApiClient::new(&self.config(), dyn_store).unwrap();
        (client, store)
    }

    /// Make the backend accept `access` and `refresh`.
    pub fn accept(&self, access: Option<&str>, refresh: Option<&str>) {
        let mut state = self.state.lock().unwrap();
        state.valid_access = access.map(str::to_string);
        state.valid_refresh = refresh.map(str::to_string);
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

/// Session for seeding a store.
#[allow(dead_code)]
pub fn session(access: &str, refresh: &str) -> Session {
    Session {
        user: User {
            id: "1".to_string(),
            username: "alice".to_string(),
            email: None,
            first_name: None,
            last_name: None,
        },
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
    }
}

/// Address nothing is listening on.
#[allow(dead_code)]
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

// ─── Handlers ────────────────────────────────────────────────

type Reply = (StatusCode, Json<Value>);

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

/// Record the header and decide whether a protected request is allowed.
fn authorize(state: &Shared, headers: &HeaderMap) -> Result<(), Reply> {
    let mut state = state.lock().unwrap();
    let seen = auth_header(headers);
    state.protected_auth.push(seen.clone());

    let expected = state.valid_access.as_ref().map(|t| format!("Bearer {}", t));
    if state.reject_all || seen.is_none() || seen != expected {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid"
            })),
        ));
    }
    Ok(())
}

fn record_json(id: usize, name: &str, rows: usize) -> Value {
    json!({
        "id": id,
        "name": name,
        "uploaded_by": "alice",
        "uploaded_at": format!("2026-03-{:02}T10:00:00.000000Z", (id % 28) + 1),
        "total_rows": rows,
        "avg_usage_hours": 119.8,
        "avg_power": 6.1,
        "equipment_distribution": {"Pump": 4, "Valve": 3}
    })
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = state.lock().unwrap();
    state.login_calls += 1;

    if body["username"] == "alice" && body["password"] == "secret1" {
        state.valid_access = Some("A1".to_string());
        state.valid_refresh = Some("R1".to_string());
        return (
            StatusCode::OK,
            Json(json!({
                "access": "A1",
                "refresh": "R1",
                "user": {"id": 1, "username": "alice"}
            })),
        );
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "No active account found with the given credentials"})),
    )
}

async fn refresh(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    let mut state = state.lock().unwrap();
    state.refresh_auth.push(auth_header(&headers));

    let presented = body["refresh"].as_str().map(str::to_string);
    if presented.is_some() && presented == state.valid_refresh {
        let access = state.next_access.clone();
        state.valid_access = Some(access.clone());
        return (StatusCode::OK, Json(json!({ "access": access })));
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Token is invalid or expired", "code": "token_not_valid"})),
    )
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    if body["username"] == "taken" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"username": ["A user with that username already exists."]})),
        );
    }

    let mut state = state.lock().unwrap();
    state.valid_access = Some("S1".to_string());
    state.valid_refresh = Some("SR1".to_string());

    (
        StatusCode::CREATED,
        Json(json!({
            "access": "S1",
            "refresh": "SR1",
            "user": {"id": 2, "username": body["username"], "email": body["email"]}
        })),
    )
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }

    let mut file = None;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap().to_vec();
        file = Some((name, filename, bytes));
    }

    let Some((name, filename, bytes)) = file else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No file provided"})));
    };

    let mut state = state.lock().unwrap();
    state.uploads.push((name.clone(), filename.clone(), bytes.clone()));

    if name != "file" {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "No file provided"})));
    }
    if !filename.ends_with(".csv") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Only CSV files are supported"})),
        );
    }

    let rows = String::from_utf8_lossy(&bytes).lines().count().saturating_sub(1);
    if rows == 0 {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "CSV file is empty"})));
    }

    let id = HISTORY_TOTAL + state.uploads.len();
    (StatusCode::CREATED, Json(record_json(id, &filename, rows)))
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: usize,
    offset: usize,
}

async fn history(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }

    // Newest first: ids HISTORY_TOTAL down to 1
    let results: Vec<Value> = (1..=HISTORY_TOTAL)
        .rev()
        .skip(query.offset)
        .take(query.limit)
        .map(|id| record_json(id, &format!("equipment_{}.csv", id), 15))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "count": HISTORY_TOTAL,
            "limit": query.limit,
            "offset": query.offset,
            "results": results
        })),
    )
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    if let Err(reply) = authorize(&state, &headers) {
        return reply;
    }
    (
        StatusCode::OK,
        Json(json!({"id": 1, "username": "alice", "email": "alice@example.com"})),
    )
}

async fn logout(State(state): State<Shared>) -> Reply {
    state.lock().unwrap().logout_calls += 1;
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "logout is not implemented"})),
    )
}
