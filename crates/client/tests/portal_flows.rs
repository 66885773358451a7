//! End-to-end client flows against a mock portal backend.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use portal_client::{NewPost, PageQuery, PortalClient, PortalConfig, SignupRequest};

struct Backend {
    valid_token: RwLock<String>,
    next_token: RwLock<String>,
    reissue_hits: AtomicUsize,
    logout_hits: AtomicUsize,
    signup_saw_auth_header: AtomicBool,
}

impl Backend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            valid_token: RwLock::new("tok-1".to_string()),
            next_token: RwLock::new("tok-2".to_string()),
            reissue_hits: AtomicUsize::new(0),
            logout_hits: AtomicUsize::new(0),
            signup_saw_auth_header: AtomicBool::new(false),
        })
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_token.read().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|header| header == expected)
    }

    /// Invalidate the current access token, as the backend does when it
    /// expires; the next reissue grants `next_token`.
    fn expire_access_token(&self) {
        *self.valid_token.write().unwrap() = self.next_token.read().unwrap().clone();
    }
}

fn ok(data: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({"code": 0, "message": "ok", "data": data})),
    )
}

fn expired() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"code": 4101, "message": "access token expired", "data": null})),
    )
}

async fn login(State(_): State<Arc<Backend>>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    ok(json!({
        "access_token": "tok-1",
        "username": body["username"],
        "nickname": "Jihye",
        "roles": ["USER"]
    }))
}

async fn signup(
    State(state): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.contains_key("authorization") {
        state.signup_saw_auth_header.store(true, Ordering::SeqCst);
    }
    ok(Value::Null)
}

async fn me(State(state): State<Arc<Backend>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return expired();
    }
    ok(json!({"username": "jihye", "nickname": "Jihye", "roles": ["USER"]}))
}

async fn reissue(State(state): State<Arc<Backend>>) -> (StatusCode, Json<Value>) {
    state.reissue_hits.fetch_add(1, Ordering::SeqCst);
    let token = state.next_token.read().unwrap().clone();
    *state.valid_token.write().unwrap() = token.clone();
    ok(json!(token))
}

async fn logout(State(state): State<Arc<Backend>>) -> (StatusCode, Json<Value>) {
    state.logout_hits.fetch_add(1, Ordering::SeqCst);
    ok(Value::Null)
}

async fn news_list(
    State(state): State<Arc<Backend>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return expired();
    }
    ok(json!({
        "items": [
            {
                "id": 1,
                "title": "service maintenance notice",
                "category": "notice",
                "published_at": "2026-03-02T00:00:00Z",
                "summary": "scheduled downtime"
            },
            {
                "id": 2,
                "title": "spring update",
                "category": "release",
                "published_at": "2026-03-05T00:00:00Z"
            }
        ],
        "page": 1,
        "total_pages": 1,
        "total_items": 2
    }))
}

async fn create_post(
    State(state): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !state.authorized(&headers) {
        return expired();
    }
    ok(json!({
        "id": 41,
        "title": body["title"],
        "content": body["content"],
        "author": "jihye",
        "created_at": "2026-03-06T12:00:00Z",
        "updated_at": null
    }))
}

/// Initialize tracing for tests with appropriate settings
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

async fn spawn_backend(state: Arc<Backend>) -> SocketAddr {
    init_tracing();
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/me", get(me))
        .route("/auth/reissue", post(reissue))
        .route("/auth/logout", post(logout))
        .route("/news", get(news_list))
        .route("/board/posts", post(create_post))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });
    addr
}

fn client_for(addr: SocketAddr) -> PortalClient {
    let config = PortalConfig::new(&format!("http://{addr}")).expect("config");
    PortalClient::new(config).expect("client")
}

#[tokio::test]
async fn test_login_me_logout_flow() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    let config = PortalConfig::new(&format!("http://{addr}"))
        .expect("config")
        .with_session_file(&session_path);
    let client = PortalClient::new(config).expect("client");

    let identity = client.auth().login("jihye", "secret").await.expect("login");
    assert_eq!(identity.nickname, "Jihye");
    assert_eq!(client.store().access_token().as_deref(), Some("tok-1"));
    assert!(session_path.exists());

    let me = client.auth().me().await.expect("me");
    assert_eq!(me.username, "jihye");
    assert!(me.has_role("USER"));

    client.auth().logout().await.expect("logout");
    assert!(client.store().access_token().is_none());
    assert!(!session_path.exists());
    assert_eq!(backend.logout_hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_news_list_decodes() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;
    let client = client_for(addr);

    client.auth().login("jihye", "secret").await.expect("login");
    let page = client.news().list(PageQuery::default()).await.expect("news");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].summary, "scheduled downtime");
    // The second row has no summary field; it defaults to empty.
    assert!(page.items[1].summary.is_empty());
    assert!(page.is_last());
}

#[tokio::test]
async fn test_silent_refresh_through_client() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    let config = PortalConfig::new(&format!("http://{addr}"))
        .expect("config")
        .with_session_file(&session_path);
    let client = PortalClient::new(config).expect("client");

    client.auth().login("jihye", "secret").await.expect("login");
    backend.expire_access_token();

    let page = client
        .news()
        .list(PageQuery::default())
        .await
        .expect("recovers via reissue");

    assert_eq!(page.items.len(), 2);
    assert_eq!(backend.reissue_hits.load(Ordering::SeqCst), 1);
    assert_eq!(client.store().access_token().as_deref(), Some("tok-2"));

    // The refreshed token was mirrored to the session file.
    let persisted = std::fs::read_to_string(&session_path).unwrap();
    assert!(persisted.contains("tok-2"));
}

#[tokio::test]
async fn test_board_create() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;
    let client = client_for(addr);

    client.auth().login("jihye", "secret").await.expect("login");
    let post = client
        .board()
        .create(&NewPost {
            title: "hello board".to_string(),
            content: "first post".to_string(),
        })
        .await
        .expect("create post");

    assert_eq!(post.id, 41);
    assert_eq!(post.title, "hello board");
    assert!(post.updated_at.is_none());
}

#[tokio::test]
async fn test_signup_goes_out_unauthenticated() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;
    let client = client_for(addr);

    // Even with a live session, signup must not carry the credential.
    client.auth().login("jihye", "secret").await.expect("login");
    client
        .auth()
        .signup(&SignupRequest {
            username: "minho".to_string(),
            password: "pw".to_string(),
            nickname: "Minho".to_string(),
            email: "minho@example.com".to_string(),
        })
        .await
        .expect("signup");

    assert!(!backend.signup_saw_auth_header.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_session_hydration_on_construction() {
    let backend = Backend::new();
    let addr = spawn_backend(backend.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let session_path = dir.path().join("session.json");
    let config = PortalConfig::new(&format!("http://{addr}"))
        .expect("config")
        .with_session_file(&session_path);

    {
        let client = PortalClient::new(config.clone()).expect("client");
        client.auth().login("jihye", "secret").await.expect("login");
    }

    // A new client over the same session file starts authenticated.
    let revived = PortalClient::new(config).expect("client");
    assert_eq!(revived.store().access_token().as_deref(), Some("tok-1"));
    assert_eq!(revived.store().identity().unwrap().username, "jihye");

    let me = revived.auth().me().await.expect("me with hydrated token");
    assert_eq!(me.username, "jihye");
}
