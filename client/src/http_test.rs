use mockito::{Matcher, Server};
use serde_json::json;

use super::*;
use crate::notify::MemoryNotifier;
use crate::router::Router;
use crate::test_support::user;

struct Harness {
    interceptor: Interceptor,
    session: SessionStore,
    router: Router,
    notifier: Arc<MemoryNotifier>,
}

fn harness(base_url: &str) -> Harness {
    let session = SessionStore::in_memory();
    session.set_user(user(1, "Ann"), "tok".into());
    let router = Router::new(session.clone());
    let notifier = Arc::new(MemoryNotifier::new());
    let config = ClientConfig { base_url: base_url.to_owned(), ..ClientConfig::default() };
    let interceptor =
        Interceptor::new(&config, session.clone(), Arc::new(router.clone()), notifier.clone()).unwrap();
    Harness { interceptor, session, router, notifier }
}

#[tokio::test]
async fn attaches_token_and_standard_headers() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/user")
        .match_header("authorization", "Bearer tok")
        .match_header("accept", "application/json")
        .match_header("x-requested-with", "XMLHttpRequest")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;
    let h = harness(&server.url());

    let body: Value = h.interceptor.send(Method::GET, "/user", None).await.unwrap();

    m.assert_async().await;
    assert_eq!(body["ok"], true);
    assert!(h.notifier.notices().is_empty());
}

#[tokio::test]
async fn omits_authorization_when_signed_out() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/auth/login")
        .match_header("authorization", Matcher::Missing)
        .match_body(Matcher::Json(json!({"email": "a@b.com"})))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let h = harness(&server.url());
    h.session.clear_user();

    let _: Value = h
        .interceptor
        .send(Method::POST, "/auth/login", Some(json!({"email": "a@b.com"})))
        .await
        .unwrap();

    m.assert_async().await;
}

#[tokio::test]
async fn unauthorized_clears_session_and_routes_to_login() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/categories")
        .with_status(401)
        .with_body(r#"{"message": "Unauthenticated."}"#)
        .create_async()
        .await;
    let h = harness(&server.url());
    h.router.navigate(Route::Categories);

    let err = h
        .interceptor
        .send::<Value>(Method::GET, "/categories", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!h.session.is_authenticated());
    assert_eq!(h.router.current(), Route::Login);
    assert_eq!(h.notifier.notices(), ["Unauthenticated."]);
}

#[tokio::test]
async fn unauthorized_without_message_uses_default_notice() {
    let mut server = Server::new_async().await;
    server.mock("GET", "/api/user").with_status(401).create_async().await;
    let h = harness(&server.url());

    let _ = h.interceptor.send::<Value>(Method::GET, "/user", None).await;

    assert_eq!(h.notifier.notices(), [SESSION_EXPIRED]);
}

#[tokio::test]
async fn other_errors_notify_but_keep_session() {
    let mut server = Server::new_async().await;
    for (status, path) in [(403, "/api/a"), (404, "/api/b"), (500, "/api/c"), (418, "/api/d")] {
        server.mock("GET", path).with_status(status).create_async().await;
    }
    let h = harness(&server.url());

    for path in ["/a", "/b", "/c", "/d"] {
        let _ = h.interceptor.send::<Value>(Method::GET, path, None).await;
    }

    assert_eq!(h.notifier.notices(), [FORBIDDEN, NOT_FOUND, SERVER_ERROR, "Error: 418"]);
    assert!(h.session.is_authenticated());
    assert_eq!(h.router.current(), Route::Home);
}

#[tokio::test]
async fn server_message_wins_and_field_errors_survive() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/categories")
        .with_status(422)
        .with_body(r#"{"message": "The name field is required.", "errors": {"name": ["The name field is required."]}}"#)
        .create_async()
        .await;
    let h = harness(&server.url());

    let err = h
        .interceptor
        .send::<Value>(Method::POST, "/categories", Some(json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "The name field is required.");
    assert_eq!(err.field_error("name"), Some("The name field is required."));
    assert_eq!(h.notifier.notices(), ["The name field is required."]);
}

#[tokio::test]
async fn network_failure_notifies_and_keeps_session() {
    // Port 9 (discard) on localhost is closed in test environments.
    let h = harness("http://127.0.0.1:9");

    let err = h
        .interceptor
        .send::<Value>(Method::GET, "/user", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(h.notifier.notices(), [NETWORK_ERROR]);
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn malformed_success_body_notifies() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/categories")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>proxy page</html>")
        .create_async()
        .await;
    let h = harness(&server.url());

    let err = h
        .interceptor
        .send::<Value>(Method::GET, "/categories", None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
    assert_eq!(h.notifier.notices(), [UNEXPECTED_RESPONSE]);
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn stale_unauthorized_keeps_newer_session() {
    let mut server = Server::new_async().await;
    let h = harness(&server.url());
    let session = h.session.clone();
    server
        .mock("GET", "/api/categories")
        .match_header("authorization", "Bearer tok")
        .with_status(401)
        .with_body_from_request(move |_| {
            // A fresh sign-in lands while the old request is in flight.
            session.set_user(user(2, "Bea"), "fresh".into());
            br#"{"message": "Unauthenticated."}"#.to_vec()
        })
        .create_async()
        .await;
    h.router.navigate(Route::Categories);

    let err = h
        .interceptor
        .send::<Value>(Method::GET, "/categories", None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(h.session.token().as_deref(), Some("fresh"));
    assert_eq!(h.router.current(), Route::Categories);
    assert_eq!(h.notifier.notices(), ["Unauthenticated."]);
}

#[test]
fn default_notice_table() {
    assert_eq!(default_notice(StatusCode::UNAUTHORIZED), SESSION_EXPIRED);
    assert_eq!(default_notice(StatusCode::FORBIDDEN), FORBIDDEN);
    assert_eq!(default_notice(StatusCode::NOT_FOUND), NOT_FOUND);
    assert_eq!(default_notice(StatusCode::INTERNAL_SERVER_ERROR), SERVER_ERROR);
    assert_eq!(default_notice(StatusCode::BAD_GATEWAY), "Error: 502");
}
