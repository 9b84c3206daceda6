use axum::http::Method;
use serde_json::json;

use super::*;
use crate::routes::app;
use crate::state::test_helpers::{register, send, test_app_state};

#[tokio::test]
async fn crud_round_trip() {
    let app = app(test_app_state());
    let (token, user_id) = register(&app, "a@b.com").await;

    let (status, created) =
        send(&app, Method::POST, "/api/categories", Some(&token), Some(json!({"name": "Food"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_id"], user_id);
    let uri = format!("/api/categories/{}", created["id"]);

    let (status, updated) = send(&app, Method::PUT, &uri, Some(&token), Some(json!({"name": "Groceries"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Groceries");

    let (status, listed) = send(&app, Method::GET, "/api/categories", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully.");

    let (status, body) = send(&app, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found.");
}

#[tokio::test]
async fn client_supplied_user_id_is_ignored() {
    let app = app(test_app_state());
    let (_, victim) = register(&app, "victim@b.com").await;
    let (token, user_id) = register(&app, "a@b.com").await;

    let (_, created) = send(
        &app,
        Method::POST,
        "/api/categories",
        Some(&token),
        Some(json!({"name": "Food", "user_id": victim})),
    )
    .await;

    assert_eq!(created["user_id"], user_id);
}

#[tokio::test]
async fn other_users_category_expenses_are_not_found() {
    let app = app(test_app_state());
    let (owner, _) = register(&app, "owner@b.com").await;
    let (intruder, _) = register(&app, "intruder@b.com").await;
    let (_, category) = send(&app, Method::POST, "/api/categories", Some(&owner), Some(json!({"name": "Rent"}))).await;
    let uri = format!("/api/categories/{}/expenses", category["id"]);

    let (status, _) = send(&app, Method::GET, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn validation_errors_carry_field_messages() {
    let app = app(test_app_state());
    let (token, _) = register(&app, "a@b.com").await;

    let (status, body) = send(&app, Method::POST, "/api/categories", Some(&token), Some(json!({"name": ""}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "The name field is required.");
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
}

#[tokio::test]
async fn non_numeric_id_is_rejected_as_json() {
    let app = app(test_app_state());
    let (token, _) = register(&app, "a@b.com").await;

    let (status, body) = send(&app, Method::GET, "/api/categories/abc", Some(&token), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}
