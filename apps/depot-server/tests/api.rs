//! End-to-end API contract tests.
//!
//! Each test runs against a fresh router backed by a scratch SQLite file and
//! upload directory.

use axum::http::header::COOKIE;
use axum::http::{HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use depot_server::config::{AuthConfig, Config, DatabaseConfig, ServerConfig, StorageConfig};
use depot_server::db;
use depot_server::routes;
use depot_server::state::AppState;

struct TestApp {
    server: TestServer,
    upload_dir: std::path::PathBuf,
    _dir: TempDir,
}

async fn spawn_app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let upload_dir = dir.path().join("uploads");
    tokio::fs::create_dir_all(&upload_dir).await.unwrap();

    let db_url = format!("sqlite://{}/depot.db", dir.path().display());
    let pool = db::create_pool(&db_url).await.unwrap();

    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig { url: db_url },
        storage: StorageConfig {
            upload_dir: upload_dir.clone(),
        },
        auth: AuthConfig {
            secret: "test-secret".to_string(),
        },
    };

    let state = AppState::new(config, pool);
    let server = TestServer::new(routes::app(state)).unwrap();

    TestApp {
        server,
        upload_dir,
        _dir: dir,
    }
}

async fn register(app: &TestApp, username: &str, password: &str) -> StatusCode {
    app.server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await
        .status_code()
}

/// Log in and return the bearer token from the response body.
async fn login(app: &TestApp, username: &str, password: &str) -> String {
    let response = app
        .server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body["jwt_token"].as_str().unwrap().to_string()
}

fn auth_cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Authorization=Bearer {token}")).unwrap()
}

/// Build a multipart body with a single `file` field.
fn multipart_body(filename: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "depot-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

async fn upload(app: &TestApp, token: &str, filename: &str, data: &[u8]) -> StatusCode {
    let (content_type, body) = multipart_body(filename, data);
    app.server
        .post("/upload")
        .add_header(COOKIE, auth_cookie(token))
        .content_type(&content_type)
        .bytes(body.into())
        .await
        .status_code()
}

async fn list_files(app: &TestApp, token: &str) -> Vec<Value> {
    let response = app
        .server
        .get("/files")
        .add_header(COOKIE, auth_cookie(token))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    body.as_array().unwrap().clone()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = spawn_app().await;
    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_then_login_authorizes_protected_routes() {
    let app = spawn_app().await;

    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let token = login(&app, "alice", "pw1").await;

    assert_eq!(list_files(&app, &token).await, Vec::<Value>::new());
    assert_eq!(upload(&app, &token, "a.txt", b"hello").await, StatusCode::OK);
}

#[tokio::test]
async fn register_echoes_username_and_never_the_password() {
    let app = spawn_app().await;
    let response = app
        .server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "pw1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body, json!({ "username": "alice" }));
}

#[tokio::test]
async fn duplicate_username_yields_conflict() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    assert_eq!(register(&app, "alice", "pw2").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn username_length_is_validated() {
    let app = spawn_app().await;
    assert_eq!(
        register(&app, "ab", "pw1").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        register(&app, "loooooooong_user", "pw1").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        register(&app, "abc", "").await,
        StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn login_failures_are_distinguished() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);

    let wrong_password = app
        .server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "wrongpwd" }))
        .await;
    assert_eq!(wrong_password.status_code(), StatusCode::FORBIDDEN);

    let unknown_user = app
        .server
        .post("/login")
        .json(&json!({ "username": "no-user", "password": "pw1" }))
        .await;
    assert_eq!(unknown_user.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_sets_bearer_cookie() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);

    let response = app
        .server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "pw1" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .expect("login must set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("Authorization=Bearer "));
}

#[tokio::test]
async fn protected_routes_require_a_credential() {
    let app = spawn_app().await;

    let response = app.server.get("/files").await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (content_type, body) = multipart_body("a.txt", b"hello");
    let response = app
        .server
        .post("/upload")
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn garbage_credential_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .server
        .get("/files")
        .add_header(COOKIE, auth_cookie("not-a-real-token"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn upload_streams_file_to_disk() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let token = login(&app, "alice", "pw1").await;

    let data = vec![42u8; 100_000];
    let (content_type, body) = multipart_body("big.bin", &data);
    let response = app
        .server
        .post("/upload")
        .add_header(COOKIE, auth_cookie(&token))
        .content_type(&content_type)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let json: Value = response.json();
    assert_eq!(json["filename"], "big.bin");

    let stored = tokio::fs::read(app.upload_dir.join("big.bin")).await.unwrap();
    assert_eq!(stored, data);
}

#[tokio::test]
async fn duplicate_filename_yields_conflict_even_across_users() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    assert_eq!(register(&app, "bob", "pw2").await, StatusCode::OK);

    let alice = login(&app, "alice", "pw1").await;
    assert_eq!(upload(&app, &alice, "a.txt", b"first").await, StatusCode::OK);

    // Same user, same filename
    assert_eq!(
        upload(&app, &alice, "a.txt", b"again").await,
        StatusCode::CONFLICT
    );

    // Different user, same filename
    let bob = login(&app, "bob", "pw2").await;
    assert_eq!(
        upload(&app, &bob, "a.txt", b"mine now").await,
        StatusCode::CONFLICT
    );

    // Exactly one record, attributed to the first uploader
    let files = list_files(&app, &alice).await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "a.txt");
    assert_eq!(files[0]["uploaded_by"], "alice");
}

#[tokio::test]
async fn upload_conflicting_with_a_file_on_disk_yields_conflict() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let token = login(&app, "alice", "pw1").await;

    // A file left behind by a severed transfer: on disk but never
    // registered. It must look like a duplicate, not a server error.
    tokio::fs::write(app.upload_dir.join("a.txt"), b"partial")
        .await
        .unwrap();

    assert_eq!(
        upload(&app, &token, "a.txt", b"fresh").await,
        StatusCode::CONFLICT
    );

    // The orphan is left untouched and nothing was registered.
    let stored = tokio::fs::read(app.upload_dir.join("a.txt")).await.unwrap();
    assert_eq!(stored, b"partial");
    assert_eq!(list_files(&app, &token).await, Vec::<Value>::new());
}

#[tokio::test]
async fn traversal_filenames_are_reduced_to_basenames() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let token = login(&app, "alice", "pw1").await;

    assert_eq!(
        upload(&app, &token, "../../evil.txt", b"payload").await,
        StatusCode::OK
    );

    assert!(app.upload_dir.join("evil.txt").exists());
    let files = list_files(&app, &token).await;
    assert_eq!(files[0]["filename"], "evil.txt");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = spawn_app().await;
    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    let token = login(&app, "alice", "pw1").await;

    let boundary = "depot-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"other\"\r\n\r\n\
         value\r\n\
         --{boundary}--\r\n"
    );
    let response = app
        .server
        .post("/upload")
        .add_header(COOKIE, auth_cookie(&token))
        .content_type(&format!("multipart/form-data; boundary={boundary}"))
        .bytes(body.into_bytes().into())
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn alice_and_bob_scenario() {
    let app = spawn_app().await;

    assert_eq!(register(&app, "alice", "pw1").await, StatusCode::OK);
    assert_eq!(register(&app, "bob", "pw2").await, StatusCode::OK);

    let alice = login(&app, "alice", "pw1").await;
    assert_eq!(
        upload(&app, &alice, "report.pdf", b"%PDF-1.4").await,
        StatusCode::OK
    );

    let files = list_files(&app, &alice).await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["filename"], "report.pdf");
    assert_eq!(files[0]["uploaded_by"], "alice");
    assert!(files[0]["uploaded_at"].as_str().is_some());

    let bob = login(&app, "bob", "pw2").await;
    assert_eq!(
        upload(&app, &bob, "report.pdf", b"other bytes").await,
        StatusCode::CONFLICT
    );
}
