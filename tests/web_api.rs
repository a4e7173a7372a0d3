//! Web API end-to-end tests.
//!
//! Full request flows over an in-memory database and a temporary blob
//! directory: registration, login, upload, download, sharing, visibility,
//! search, and deletion.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use stash::auth::TokenIssuer;
use stash::web::{create_router, AppState};
use stash::{BlobStore, Database, HostingService};

/// Create a test server over fresh state.
async fn create_test_server() -> (TestServer, TempDir) {
    let db = Database::open_in_memory()
        .await
        .expect("failed to create test database");
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let store = BlobStore::new(temp_dir.path()).expect("failed to create blob store");

    let service = HostingService::new(db, store);
    let tokens = TokenIssuer::new("test-secret-key-for-testing-only", 900);
    let state = Arc::new(AppState::new(service, tokens));

    let router = create_router(state, &[], 10 * 1024 * 1024);
    let server = TestServer::new(router).expect("failed to create test server");

    (server, temp_dir)
}

/// Register a user and return an access token.
async fn register_and_login(server: &TestServer, username: &str, password: &str) -> String {
    server
        .post("/register")
        .json(&json!({ "username": username, "password": password }))
        .await
        .assert_status_ok();

    let response = server
        .post("/login")
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    body["access_token"].as_str().unwrap().to_string()
}

/// Upload a file as the given user.
async fn upload_file(
    server: &TestServer,
    token: &str,
    filename: &str,
    content: &[u8],
    is_public: bool,
) {
    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(content.to_vec())
                .file_name(filename.to_string())
                .mime_type("text/plain"),
        )
        .add_text("is_public", if is_public { "true" } else { "false" });

    let response = server
        .post("/upload")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .multipart(form)
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["filename"], filename);
}

#[tokio::test]
async fn test_register_login_round_trip() {
    let (server, _tmp) = create_test_server().await;

    let token = register_and_login(&server, "alice", "password123").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let (server, _tmp) = create_test_server().await;

    register_and_login(&server, "alice", "password123").await;

    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "otherpassword" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_invalid_input() {
    let (server, _tmp) = create_test_server().await;

    // Username too short
    let response = server
        .post("/register")
        .json(&json!({ "username": "ab", "password": "password123" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Password too short
    let response = server
        .post("/register")
        .json(&json!({ "username": "alice", "password": "short" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_wrong_credentials() {
    let (server, _tmp) = create_test_server().await;

    register_and_login(&server, "alice", "password123").await;

    let response = server
        .post("/login")
        .json(&json!({ "username": "alice", "password": "wrong-password" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .post("/login")
        .json(&json!({ "username": "nobody", "password": "password123" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let (server, _tmp) = create_test_server().await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"data".to_vec()).file_name("doc.txt"),
    );

    let response = server.post("/upload").multipart(form).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_upload_and_download_own_file() {
    let (server, _tmp) = create_test_server().await;
    let token = register_and_login(&server, "alice", "password123").await;

    upload_file(&server, &token, "notes.txt", b"my notes", false).await;

    let response = server
        .get("/files/notes.txt")
        .add_header(AUTHORIZATION, format!("Bearer {token}"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"my notes");
}

#[tokio::test]
async fn test_anonymous_download_respects_visibility() {
    let (server, _tmp) = create_test_server().await;
    let token = register_and_login(&server, "alice", "password123").await;

    upload_file(&server, &token, "open.txt", b"public data", true).await;
    upload_file(&server, &token, "closed.txt", b"private data", false).await;

    let response = server.get("/files/open.txt").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"public data");

    let response = server.get("/files/closed.txt").await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_download_missing_file() {
    let (server, _tmp) = create_test_server().await;

    let response = server.get("/files/ghost.txt").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_filename_conflicts() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;
    let bob = register_and_login(&server, "bob", "password123").await;

    upload_file(&server, &alice, "taken.txt", b"original", false).await;

    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(b"usurper".to_vec()).file_name("taken.txt"),
    );
    let response = server
        .post("/upload")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .multipart(form)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    // The original is untouched
    let response = server
        .get("/files/taken.txt")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"original");
}

#[tokio::test]
async fn test_share_flow() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;
    let bob = register_and_login(&server, "bob", "password123").await;

    upload_file(&server, &alice, "report.pdf", b"q3 numbers", false).await;

    // Bob cannot read before the grant
    let response = server
        .get("/files/report.pdf")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    // Alice shares with bob
    let response = server
        .post("/files/share")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .json(&json!({ "filename": "report.pdf", "share_with": "bob" }))
        .await;
    response.assert_status_ok();

    // Now bob can read
    let response = server
        .get("/files/report.pdf")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"q3 numbers");

    // Alice deletes; the file is gone for everyone
    let response = server
        .delete("/files/report.pdf")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    response.assert_status_ok();

    let response = server
        .get("/files/report.pdf")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_with_unknown_user() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;

    upload_file(&server, &alice, "doc.txt", b"data", false).await;

    let response = server
        .post("/files/share")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .json(&json!({ "filename": "doc.txt", "share_with": "nobody" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_requires_ownership() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;
    let bob = register_and_login(&server, "bob", "password123").await;

    upload_file(&server, &alice, "hers.txt", b"data", false).await;

    let response = server
        .post("/files/share")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .json(&json!({ "filename": "hers.txt", "share_with": "bob" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_ownership() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;
    let bob = register_and_login(&server, "bob", "password123").await;

    upload_file(&server, &alice, "keep.txt", b"data", true).await;

    // Not the owner: absent and unowned are indistinguishable
    let response = server
        .delete("/files/keep.txt")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // Still there
    server.get("/files/keep.txt").await.assert_status_ok();
}

#[tokio::test]
async fn test_toggle_visibility_round_trip() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;

    upload_file(&server, &alice, "flip.txt", b"data", false).await;
    server
        .get("/files/flip.txt")
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = server
        .post("/files/toggle-visibility")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .json(&json!({ "filename": "flip.txt", "make_public": true }))
        .await;
    response.assert_status_ok();
    server.get("/files/flip.txt").await.assert_status_ok();

    let response = server
        .post("/files/toggle-visibility")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .json(&json!({ "filename": "flip.txt", "make_public": false }))
        .await;
    response.assert_status_ok();
    server
        .get("/files/flip.txt")
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_scope_and_filters() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;
    let bob = register_and_login(&server, "bob", "password123").await;

    upload_file(&server, &alice, "alice-notes.txt", b"1", false).await;
    upload_file(&server, &bob, "bob-secret.txt", b"2", false).await;
    upload_file(&server, &bob, "bob-shared.txt", b"3", false).await;

    server
        .post("/files/share")
        .add_header(AUTHORIZATION, format!("Bearer {bob}"))
        .json(&json!({ "filename": "bob-shared.txt", "share_with": "alice" }))
        .await
        .assert_status_ok();

    // Alice sees her own file and the one shared with her
    let response = server
        .get("/files")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["filename"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"alice-notes.txt"));
    assert!(names.contains(&"bob-shared.txt"));

    // Name filter is case-insensitive
    let response = server
        .get("/files?name=NOTES")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    let body = response.json::<Value>();
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Responses never carry internal identifiers
    assert!(body[0].get("stored_key").is_none());
    assert!(body[0].get("id").is_none());
}

#[tokio::test]
async fn test_search_invalid_date_range() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;

    let response = server
        .get("/files?from=2024-12-01T00:00:00&to=2024-01-01T00:00:00")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .get("/files?from=yesterday&to=today")
        .add_header(AUTHORIZATION, format!("Bearer {alice}"))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_requires_authentication() {
    let (server, _tmp) = create_test_server().await;

    let response = server.get("/files").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_public_files_listing() {
    let (server, _tmp) = create_test_server().await;
    let alice = register_and_login(&server, "alice", "password123").await;

    upload_file(&server, &alice, "open.txt", b"1", true).await;
    upload_file(&server, &alice, "closed.txt", b"2", false).await;

    // No authentication needed
    let response = server.get("/public-files").await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["filename"], "open.txt");
    assert_eq!(records[0]["visibility"], "public");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let (server, _tmp) = create_test_server().await;

    let response = server
        .get("/files")
        .add_header(AUTHORIZATION, "Bearer not.a.valid.token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
