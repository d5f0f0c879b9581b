#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use ecodeli_api::auth::jwt::{generate_access_token, JwtConfig};
use ecodeli_api::config::ServerConfig;
use ecodeli_api::routes;
use ecodeli_api::state::AppState;
use ecodeli_api::storage::DocumentStorage;
use ecodeli_core::documents::DocumentType;
use ecodeli_core::requirements::RequirementCatalog;
use ecodeli_core::roles::UserRole;
use ecodeli_db::models::user::{CreateUser, User};
use ecodeli_db::repositories::UserRepo;
use ecodeli_events::EventBus;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub const MULTIPART_BOUNDARY: &str = "ecodeli-test-boundary";

/// Minimal valid-looking PDF payload.
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\ntrailer\n<<>>\n%%EOF\n";

/// Build a test `ServerConfig` with safe defaults rooted at `storage_dir`.
pub fn test_config(storage_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: jwt_config(),
        document_storage_dir: storage_dir.to_path_buf(),
        upload_body_limit_bytes: 32 * 1024 * 1024,
        expiry_sweep_interval_secs: 3600,
        document_reminder_interval_secs: 86400,
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// A test application with its own storage directory and event bus.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _storage_dir: TempDir,
}

impl TestApp {
    /// A fresh handle on the router; `oneshot` consumes it.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.state.event_bus)
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and the default requirement catalog.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack production uses.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with_catalog(pool, RequirementCatalog::default()).await
}

pub async fn build_test_app_with_catalog(pool: PgPool, catalog: RequirementCatalog) -> TestApp {
    let storage_dir = tempfile::tempdir().unwrap();
    let config = test_config(storage_dir.path());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        catalog: Arc::new(catalog),
        storage: Arc::new(DocumentStorage::new(storage_dir.path())),
    };

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:5173".parse().unwrap()])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes(&config))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state.clone());

    TestApp {
        router,
        state,
        _storage_dir: storage_dir,
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with `role`. `name` must be unique within a test.
pub async fn create_user(pool: &PgPool, name: &str, role: UserRole) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: None,
            role_id: role.id(),
        },
    )
    .await
    .unwrap()
}

/// Access token for `user`, carrying the user's stored role.
pub fn token_for(user: &User) -> String {
    let role = UserRole::from_id(user.role_id).unwrap();
    generate_access_token(user.id, role, &jwt_config()).unwrap()
}

/// Create a user and return it with a valid access token.
pub async fn user_with_token(pool: &PgPool, name: &str, role: UserRole) -> (User, String) {
    let user = create_user(pool, name, role).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

fn authed(method: Method, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

/// Unauthenticated GET.
pub async fn get_public(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = authed(Method::GET, uri, token).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = authed(Method::DELETE, uri, token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = authed(method, uri, token)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::POST, uri, token, body).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::PUT, uri, token, body).await
}

pub async fn patch_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send_json(app, Method::PATCH, uri, token, body).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Multipart uploads
// ---------------------------------------------------------------------------

/// A file part for [`multipart_body`].
pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

/// Encode text fields and an optional file as `multipart/form-data`.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some(file) = file {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file.filename
            )
            .as_bytes(),
        );
        if let Some(content_type) = file.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, token: &str, body: Vec<u8>) -> Response<Body> {
    let request = authed(Method::POST, uri, token)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

/// Upload `data` as a document of `document_type`.
pub async fn upload(
    app: Router,
    token: &str,
    document_type: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Response<Body> {
    let body = multipart_body(
        &[("type", document_type)],
        Some(FilePart {
            filename,
            content_type: Some(content_type),
            data,
        }),
    );
    post_multipart(app, "/api/v1/documents", token, body).await
}

/// Upload a small PDF of `document_type` and return the new document id.
pub async fn upload_pdf(app: Router, token: &str, document_type: DocumentType) -> i64 {
    let filename = format!("{}.pdf", document_type.as_str().to_lowercase());
    let response = upload(
        app,
        token,
        document_type.as_str(),
        &filename,
        "application/pdf",
        PDF_BYTES,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Approve or reject a document through the admin status endpoint.
pub async fn decide(
    app: Router,
    admin_token: &str,
    document_id: i64,
    status: &str,
    reason: Option<&str>,
) -> Response<Body> {
    put_json(
        app,
        &format!("/api/v1/admin/documents/{document_id}/status"),
        admin_token,
        serde_json::json!({ "status": status, "rejection_reason": reason }),
    )
    .await
}
