use std::sync::Arc;

use mockito::{Matcher, Server};
use models::Decimal;
use serde_json::json;

use super::*;
use crate::notify::MemoryNotifier;
use crate::storage::MemoryStorage;
use crate::test_support::{user, user_json};
use crate::{ClientConfig, Navigator, Route, Spendy};

fn client(base_url: &str) -> Spendy {
    let config = ClientConfig { base_url: base_url.to_owned(), ..ClientConfig::default() };
    Spendy::new(&config, Arc::new(MemoryStorage::new()), Arc::new(MemoryNotifier::new())).unwrap()
}

#[tokio::test]
async fn login_stores_the_session() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"email": "a@b.com", "password": "secret123"})))
        .with_status(200)
        .with_body(json!({"token": "t1", "user": user_json(3, "Ann")}).to_string())
        .create_async()
        .await;
    let app = client(&server.url());

    let user = app
        .api
        .login(&LoginRequest { email: "a@b.com".into(), password: "secret123".into() })
        .await
        .unwrap();

    assert_eq!(user.id, 3);
    assert!(app.session.is_authenticated());
    assert_eq!(app.session.token().as_deref(), Some("t1"));
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(422)
        .with_body(
            json!({
                "message": "The provided credentials are incorrect.",
                "errors": {"email": ["The provided credentials are incorrect."]}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let app = client(&server.url());

    let err = app
        .api
        .login(&LoginRequest { email: "a@b.com".into(), password: "wrong".into() })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(err.field_error("email"), Some("The provided credentials are incorrect."));
    assert!(!app.session.is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_even_when_server_fails() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/auth/logout")
        .with_status(500)
        .create_async()
        .await;
    let app = client(&server.url());
    app.session.set_user(user(1, "Ann"), "tok".into());

    assert!(app.api.logout().await.is_err());
    assert!(!app.session.is_authenticated());
}

#[tokio::test]
async fn update_profile_refreshes_snapshot() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/api/auth/profile")
        .with_status(200)
        .with_body(json!({"message": "Profile updated successfully.", "user": user_json(1, "Annie")}).to_string())
        .create_async()
        .await;
    let app = client(&server.url());
    app.session.set_user(user(1, "Ann"), "tok".into());

    app.api
        .update_profile(&ProfileRequest { name: "Annie".into(), email: "annie@example.com".into() })
        .await
        .unwrap();

    assert_eq!(app.session.user().unwrap().name, "Annie");
    assert_eq!(app.session.token().as_deref(), Some("tok"));
}

#[tokio::test]
async fn create_expense_sends_decimal_amount() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("POST", "/api/expenses")
        .match_header("authorization", "Bearer tok")
        .match_body(Matcher::PartialJson(json!({"category_id": 2, "amount": "12.50"})))
        .with_status(201)
        .with_body(
            json!({
                "id": 9, "user_id": 1, "category_id": 2, "amount": "12.50", "description": null,
                "created_at": "2024-05-01T12:00:00Z", "updated_at": "2024-05-01T12:00:00Z"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let app = client(&server.url());
    app.session.set_user(user(1, "Ann"), "tok".into());

    let expense = app
        .api
        .create_expense(&ExpenseRequest { category_id: 2, amount: Decimal::new(1250, 2), description: None })
        .await
        .unwrap();

    m.assert_async().await;
    assert_eq!(expense.id, 9);
}

#[tokio::test]
async fn list_expenses_passes_category_filter() {
    let mut server = Server::new_async().await;
    let m = server
        .mock("GET", "/api/expenses")
        .match_query(Matcher::UrlEncoded("category_id".into(), "4".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let app = client(&server.url());
    app.session.set_user(user(1, "Ann"), "tok".into());

    let listed = app.api.list_expenses(Some(4)).await.unwrap();

    m.assert_async().await;
    assert!(listed.is_empty());
}

#[tokio::test]
async fn expired_token_mid_session_routes_to_login() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/categories/5/expenses")
        .with_status(401)
        .with_body(r#"{"message": "Unauthenticated."}"#)
        .create_async()
        .await;
    let app = client(&server.url());
    app.session.set_user(user(1, "Ann"), "stale".into());
    app.router.navigate(Route::CategoryExpenses(5));

    assert!(app.api.category_expenses(5).await.is_err());

    assert!(!app.session.is_authenticated());
    assert_eq!(app.router.current(), Route::Login);
}
