use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use axum::{
    Form, Json, Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use backend::{ApiClient, ApiError, AuthApi, ClientConfig, MemorySession, Session, SignalsApi};
use common::models::{ActionPayload, Filter, ListParams, SignalId, SignalStatus};
use serde_json::{Value, json};
use url::Url;

#[derive(Default)]
struct Recorded {
    auth_headers: Vec<Option<String>>,
    queries: Vec<Option<String>>,
    bodies: Vec<Value>,
    update_bodies: Vec<Vec<u8>>,
}

type Shared = Arc<Mutex<Recorded>>;

fn signal_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "symbol": "BTCUSDT",
        "side": "BUY",
        "entry": 64000.0,
        "sl": 63000.0,
        "tp": 66000.0,
        "qty": null,
        "ttl_sec": null,
        "status": status,
        "created_at": "2025-11-03T10:15:30",
        "ts": "2025-11-03T10:15:30"
    })
}

fn record_auth(state: &Shared, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().auth_headers.push(value);
}

async fn pending(State(state): State<Shared>, headers: HeaderMap) -> Json<Value> {
    record_auth(&state, &headers);
    Json(json!([signal_json(9, "pending"), signal_json(7, "pending")]))
}

async fn active() -> Json<Value> {
    Json(Value::Null)
}

async fn all(State(state): State<Shared>, RawQuery(query): RawQuery) -> Json<Value> {
    state.lock().unwrap().queries.push(query);
    Json(json!([
        signal_json(3, "approved"),
        signal_json(2, "executed"),
        signal_json(1, "rejected")
    ]))
}

async fn one(Path(id): Path<i64>) -> Response {
    if id == 7 {
        Json(signal_json(7, "approved")).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Signal not found"})),
        )
            .into_response()
    }
}

async fn approve(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.lock().unwrap().bodies.push(body);
    Json(json!({"status": "success", "order_id": id * 10, "binance_order_id": 123456}))
}

async fn reject() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "Signal cannot be rejected"})),
    )
        .into_response()
}

async fn update_active(State(state): State<Shared>, headers: HeaderMap, body: Bytes) -> Response {
    record_auth(&state, &headers);
    state.lock().unwrap().update_bodies.push(body.to_vec());

    let expired = headers
        .get("authorization")
        .is_some_and(|v| v.as_bytes() == b"Bearer expired");
    if expired {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if body.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body"], "msg": "Field required", "type": "missing"}]})),
        )
            .into_response();
    }
    Json(json!({"status": "updated"})).into_response()
}

async fn token(Form(form): Form<HashMap<String, String>>) -> Response {
    if form.get("password").map(String::as_str) == Some("secret") {
        Json(json!({"access_token": "issued-token", "token_type": "bearer"})).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response()
    }
}

async fn spawn_backend() -> (SocketAddr, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/signals", get(all))
        .route("/signals/pending", get(pending))
        .route("/signals/active", get(active))
        .route("/signals/update_active", post(update_active))
        .route("/signals/:id", get(one))
        .route("/signals/:id/approve", post(approve))
        .route("/signals/:id/reject", post(reject))
        .route("/auth/token", post(token))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn api_client(addr: SocketAddr, session: Arc<dyn Session>) -> ApiClient {
    let url = Url::parse(&format!("http://{}", addr)).unwrap();
    ApiClient::new(ClientConfig::new(url), session).unwrap()
}

#[tokio::test]
async fn test_pending_list_keeps_backend_order_and_sends_token() {
    let (addr, state) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::with_token("t0k"))));

    let signals = api.list_pending().await.unwrap();

    let ids: Vec<_> = signals.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![SignalId(9), SignalId(7)]);
    assert_eq!(
        state.lock().unwrap().auth_headers,
        vec![Some("Bearer t0k".to_string())]
    );
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let (addr, state) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));

    api.list(Filter::Pending).await.unwrap();

    assert_eq!(state.lock().unwrap().auth_headers, vec![None]);
}

#[tokio::test]
async fn test_null_list_body_is_empty() {
    let (addr, _) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));

    assert!(api.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_all_forwards_query_filters() {
    let (addr, state) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));

    let params = ListParams {
        status: Some("approved".to_string()),
        limit: Some(50),
        ..Default::default()
    };
    let signals = api.list_all(&params).await.unwrap();
    api.list(Filter::All).await.unwrap();

    assert_eq!(signals.len(), 3);
    assert_eq!(
        signals[1].status,
        SignalStatus::Other("executed".to_string())
    );
    let queries = state.lock().unwrap().queries.clone();
    assert_eq!(
        queries,
        vec![Some("status=approved&limit=50".to_string()), None]
    );
}

#[tokio::test]
async fn test_get_one_maps_404_to_not_found() {
    let (addr, _) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));

    let found = api.get_one(SignalId(7)).await.unwrap();
    assert_eq!(found.status, SignalStatus::Approved);

    let missing = api.get_one(SignalId(8)).await.unwrap_err();
    assert_eq!(
        missing,
        ApiError::NotFound {
            detail: "Signal not found".to_string()
        }
    );
}

#[tokio::test]
async fn test_approve_sends_payload_and_reject_surfaces_detail() {
    let (addr, state) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));

    let ack = api
        .approve(SignalId(7), &ActionPayload::with_reason("ok"))
        .await
        .unwrap();
    assert_eq!(ack.status.as_deref(), Some("success"));
    assert_eq!(ack.order_id, Some(70));
    assert_eq!(state.lock().unwrap().bodies, vec![json!({"reason": "ok"})]);

    let err = api
        .reject(SignalId(7), &ActionPayload::default())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 400,
            detail: "Signal cannot be rejected".to_string()
        }
    );
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_fires_hook_once() {
    let (addr, _) = spawn_backend().await;
    let session = Arc::new(MemorySession::with_token("expired"));
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();

    let client = api_client(addr, session.clone()).with_unauthorized_hook(Arc::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    let api = SignalsApi::new(client);

    let err = api.update_active().await.unwrap_err();

    assert_eq!(err, ApiError::Unauthorized);
    assert_eq!(session.token(), None);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_update_active_sends_no_batch() {
    let (addr, state) = spawn_backend().await;
    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::with_token("abc"))));

    let err = api.update_active().await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 422, .. }));
    assert!(err.to_string().contains("Field required"));
    let recorded = state.lock().unwrap();
    assert_eq!(recorded.update_bodies, vec![Vec::<u8>::new()]);
    assert_eq!(recorded.auth_headers, vec![Some("Bearer abc".to_string())]);
}

#[tokio::test]
async fn test_connection_refused_is_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = SignalsApi::new(api_client(addr, Arc::new(MemorySession::new())));
    let err = api.list_pending().await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn test_login_stores_token_in_session() {
    let (addr, _) = spawn_backend().await;
    let session = Arc::new(MemorySession::new());
    let auth = AuthApi::new(api_client(addr, session.clone()));

    let bad = auth.login("operator", "wrong").await.unwrap_err();
    assert_eq!(bad.status(), Some(400));
    assert_eq!(session.token(), None);

    let token = auth.login("operator", "secret").await.unwrap();
    assert_eq!(token.access_token, "issued-token");
    assert_eq!(session.token().as_deref(), Some("issued-token"));

    auth.logout().unwrap();
    assert_eq!(session.token(), None);
}
