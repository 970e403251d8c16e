#![allow(clippy::unwrap_used)]
// Integration tests for `AuthStore` against a wiremock backend.

use serde_json::json;
use tokio_stream::StreamExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coursedeck_api::CourseClient;
use coursedeck_core::store::AUTH_DATA_KEY;
use coursedeck_core::{AuthStore, CoreError, SessionStorage, User};

// ── Helpers ─────────────────────────────────────────────────────────

async fn server() -> (MockServer, CourseClient) {
    let server = MockServer::start().await;
    let client = CourseClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    (server, client)
}

fn secret(value: &str) -> secrecy::SecretString {
    value.to_string().into()
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "email": "student@test.io",
            "pictureUrl": "https://example.test/me.png"
        })))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_starts_logged_out_without_session() {
    let (_server, client) = server().await;
    let dir = tempfile::tempdir().unwrap();

    let auth = AuthStore::new(client, SessionStorage::new(dir.path()));

    assert!(auth.is_logged_out());
    assert!(auth.current_user().is_none());
}

#[tokio::test]
async fn test_login_publishes_and_persists() {
    let (server, client) = server().await;
    mount_login_ok(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path());

    let auth = AuthStore::new(client.clone(), storage.clone());
    let mut user_rx = auth.user();

    let user = auth.login("student@test.io", &secret("pw")).await.unwrap();

    assert_eq!(user.email, "student@test.io");
    assert!(user_rx.has_changed().unwrap());
    assert!(user_rx.borrow_and_update().is_some());
    assert!(auth.is_logged_in());

    let stored: User = storage.load(AUTH_DATA_KEY).unwrap().unwrap();
    assert_eq!(stored.id, Some(7));

    // A new store (a "restart") restores the session.
    let restarted = AuthStore::new(client, storage);
    assert_eq!(
        restarted.current_user().unwrap().email,
        "student@test.io"
    );
}

#[tokio::test]
async fn test_login_failure_stays_logged_out() {
    let (server, client) = server().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();

    let auth = AuthStore::new(client, SessionStorage::new(dir.path()));
    let err = auth.login("student@test.io", &secret("bad")).await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert!(auth.is_logged_out());
    assert!(!dir.path().join("auth_data.json").exists());
}

#[tokio::test]
async fn test_logout_clears_memory_and_disk() {
    let (server, client) = server().await;
    mount_login_ok(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let storage = SessionStorage::new(dir.path());

    let auth = AuthStore::new(client.clone(), storage.clone());
    auth.login("student@test.io", &secret("pw")).await.unwrap();

    let mut logged_out = auth.logged_out();
    assert_eq!(logged_out.next().await, Some(false));

    auth.logout().unwrap();

    assert_eq!(logged_out.next().await, Some(true));
    assert!(storage.load::<User>(AUTH_DATA_KEY).unwrap().is_none());
    assert!(AuthStore::new(client, storage).is_logged_out());
}

#[tokio::test]
async fn test_corrupt_session_is_ignored() {
    let (_server, client) = server().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("auth_data.json"), "not json").unwrap();

    let auth = AuthStore::new(client, SessionStorage::new(dir.path()));

    assert!(auth.is_logged_out());
}
