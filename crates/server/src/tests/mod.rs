// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Router tests driving every route through `tower::ServiceExt::oneshot`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode as HttpStatusCode, header},
    response::{IntoResponse, Response},
};
use clap::Parser;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use vms::LifecycleHandler;
use vms_api::{AuthError, AuthenticationService};
use vms_domain::MetricPolicy;
use vms_persistence::{Persistence, PersistenceError};

use crate::session::SessionError;
use crate::{AppState, Args, build_router, seed_admin, set_account_active};

/// Helper to create test app state with an admin and a viewer account.
fn create_test_app_state() -> AppState {
    let mut persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    seed_admin(&mut persistence, "admin", "admin-password").unwrap();
    persistence
        .create_user("viewer", "viewer-password", "Viewer")
        .unwrap();
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        handler: LifecycleHandler::with_tracing(MetricPolicy::default()),
        auth_service: AuthenticationService::default(),
    }
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body: Body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

async fn login_tokens(app: &Router, username: &str, password: &str) -> Value {
    let response: Response = send(
        app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    body_json(response).await
}

async fn login_token(app: &Router, username: &str, password: &str) -> String {
    login_tokens(app, username, password).await["access"]
        .as_str()
        .unwrap()
        .to_string()
}

fn vendor_body(vendor_code: &str) -> Value {
    json!({
        "name": "Acme Supplies",
        "contact_details": "5551234567",
        "address": "1 Industrial Way",
        "vendor_code": vendor_code
    })
}

fn order_body(vendor_id: i64, status: &str) -> Value {
    json!({
        "vendor": vendor_id,
        "order_date": "2024-05-01",
        "delivery_date": "2024-05-03T10:00:00Z",
        "items": [{"sku": "BOLT-10", "count": 40}],
        "quantity": 40,
        "status": status,
        "quality_rating": 4.5
    })
}

async fn create_vendor(app: &Router, token: &str, vendor_code: &str) -> i64 {
    let response: Response = send(
        app,
        "POST",
        "/vendors/",
        Some(token),
        Some(vendor_body(vendor_code)),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn create_order(app: &Router, token: &str, vendor_id: i64, status: &str) -> Value {
    let response: Response = send(
        app,
        "POST",
        "/purchase_orders/",
        Some(token),
        Some(order_body(vendor_id, status)),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn test_login_returns_tokens() {
    let app: Router = build_router(create_test_app_state());

    let body: Value = login_tokens(&app, "admin", "admin-password").await;

    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "Admin");
    assert!(body["access"].is_string());
    assert!(body["refresh"].is_string());
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_login_with_bad_password_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let response: Response = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "admin", "password": "nope"})),
    )
    .await;

    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    for uri in ["/vendors/", "/purchase_orders/", "/vendors/1/performance/"] {
        let response: Response = send(&app, "GET", uri, None, None).await;
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED, "{uri}");
    }

    let response: Response = send(&app, "GET", "/vendors/", Some("bogus"), None).await;
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vendor_crud_round() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;

    let vendor_id: i64 = create_vendor(&app, &token, "V-001").await;

    let response: Response = send(
        &app,
        "GET",
        &format!("/vendors/{vendor_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let body: Value = body_json(response).await;
    assert_eq!(body["vendor_code"], "V-001");
    assert_eq!(body["on_time_delivery_rate"], 0.0);
    assert_eq!(body["fulfillment_rate"], 0.0);

    let mut update: Value = vendor_body("V-001");
    update["name"] = json!("Acme Holdings");
    let response: Response = send(
        &app,
        "PUT",
        &format!("/vendors/{vendor_id}/"),
        Some(&token),
        Some(update),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Acme Holdings");

    let response: Response = send(
        &app,
        "DELETE",
        &format!("/vendors/{vendor_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::NO_CONTENT);

    let response: Response = send(
        &app,
        "GET",
        &format!("/vendors/{vendor_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_vendor_reports_field_errors() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;
    let mut body: Value = vendor_body("V-001");
    body["contact_details"] = json!("12345");

    let response: Response = send(&app, "POST", "/vendors/", Some(&token), Some(body)).await;

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    let body: Value = body_json(response).await;
    assert_eq!(body["error"], true);
    assert!(body["fields"]["contact_details"].is_array());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/vendors/")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response: Response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["non_field_errors"].is_array());
}

#[tokio::test]
async fn test_viewer_cannot_write() {
    let app: Router = build_router(create_test_app_state());
    let admin: String = login_token(&app, "admin", "admin-password").await;
    let viewer: String = login_token(&app, "viewer", "viewer-password").await;
    let vendor_id: i64 = create_vendor(&app, &admin, "V-001").await;

    let response: Response = send(
        &app,
        "POST",
        "/vendors/",
        Some(&viewer),
        Some(vendor_body("V-002")),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);

    let response: Response = send(
        &app,
        "POST",
        "/purchase_orders/",
        Some(&viewer),
        Some(order_body(vendor_id, "pending")),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);

    let response: Response = send(&app, "GET", "/vendors/", Some(&viewer), None).await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_purchase_order_lifecycle() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;
    let vendor_id: i64 = create_vendor(&app, &token, "V-001").await;

    let mut body: Value = order_body(vendor_id, "pending");
    body["po_number"] = json!("CLIENT-SUPPLIED");
    let response: Response =
        send(&app, "POST", "/purchase_orders/", Some(&token), Some(body)).await;
    assert_eq!(response.status(), HttpStatusCode::CREATED);
    let order: Value = body_json(response).await;
    let order_id: i64 = order["id"].as_i64().unwrap();
    let po_number: &str = order["po_number"].as_str().unwrap();
    assert_ne!(po_number, "CLIENT-SUPPLIED");
    assert_eq!(po_number.len(), 17);
    assert_eq!(order["vendor"], vendor_id);
    assert_eq!(order["status"], "pending");
    assert!(order["acknowledgment_date"].is_null());

    let response: Response = send(
        &app,
        "PUT",
        &format!("/purchase_orders/{order_id}/acknowledge/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let ack: Value = body_json(response).await;
    assert!(ack["message"].is_string());
    assert!(ack["acknowledgment_date"].is_string());

    let response: Response = send(
        &app,
        "PUT",
        &format!("/purchase_orders/{order_id}/"),
        Some(&token),
        Some(order_body(vendor_id, "completed")),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let updated: Value = body_json(response).await;
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["po_number"], order["po_number"]);
    assert_eq!(updated["acknowledgment_date"], ack["acknowledgment_date"]);

    let response: Response = send(
        &app,
        "GET",
        &format!("/vendors/{vendor_id}/performance/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    let performance: Value = body_json(response).await;
    assert_eq!(performance["fulfillment_rate"], 100.0);
    assert_eq!(performance["quality_rating_avg"], 4.5);

    let response: Response = send(
        &app,
        "GET",
        &format!("/purchase_orders/by_vendor/{vendor_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

    let response: Response = send(
        &app,
        "GET",
        &format!("/vendors/{vendor_id}/history/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response: Response = send(
        &app,
        "DELETE",
        &format!("/purchase_orders/{order_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::NO_CONTENT);

    let response: Response = send(
        &app,
        "GET",
        &format!("/purchase_orders/{order_id}/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delivery_before_order_is_rejected() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;
    let vendor_id: i64 = create_vendor(&app, &token, "V-001").await;
    let mut body: Value = order_body(vendor_id, "pending");
    body["delivery_date"] = json!("2024-04-01");

    let response: Response =
        send(&app, "POST", "/purchase_orders/", Some(&token), Some(body)).await;

    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["delivery_date"].is_array());

    let response: Response = send(&app, "GET", "/purchase_orders/", Some(&token), None).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsupported_verbs_are_method_not_allowed() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;
    let vendor_id: i64 = create_vendor(&app, &token, "V-001").await;

    let response: Response = send(
        &app,
        "PUT",
        &format!("/vendors/{vendor_id}/performance/"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::METHOD_NOT_ALLOWED);

    let response: Response = send(&app, "GET", "/login/", None, None).await;
    assert_eq!(response.status(), HttpStatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_logout_blacklists_session() {
    let app: Router = build_router(create_test_app_state());
    let tokens: Value = login_tokens(&app, "admin", "admin-password").await;
    let access: &str = tokens["access"].as_str().unwrap();

    let response: Response = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": "not-a-token"})),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);

    let response: Response = send(
        &app,
        "POST",
        "/logout/",
        Some(access),
        Some(json!({"refresh": tokens["refresh"]})),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::RESET_CONTENT);

    let response: Response = send(&app, "GET", "/vendors/", Some(access), None).await;
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
}

#[test]
fn test_seed_admin_only_when_empty() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    seed_admin(&mut persistence, "first", "password-1").unwrap();
    seed_admin(&mut persistence, "second", "password-2").unwrap();

    assert_eq!(persistence.count_users().unwrap(), 1);
    let user = persistence.get_user_by_username("first").unwrap().unwrap();
    assert_eq!(user.role, "Admin");
}

#[tokio::test]
async fn test_non_integer_id_is_json_not_found() {
    let app: Router = build_router(create_test_app_state());
    let token: String = login_token(&app, "admin", "admin-password").await;

    for uri in ["/vendors/abc/", "/purchase_orders/1.5/", "/vendors/x/history/"] {
        let response: Response = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND, "{uri}");
        let body: Value = body_json(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["message"], "Not found.");
    }
}

#[tokio::test]
async fn test_disabled_account_loses_access_until_enabled() {
    let app_state: AppState = create_test_app_state();
    let persistence = Arc::clone(&app_state.persistence);
    let app: Router = build_router(app_state);
    let token: String = login_token(&app, "viewer", "viewer-password").await;

    set_account_active(&mut *persistence.lock().await, "viewer", false).unwrap();

    let response: Response = send(&app, "GET", "/vendors/", Some(&token), None).await;
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    let response: Response = send(
        &app,
        "POST",
        "/login/",
        None,
        Some(json!({"username": "viewer", "password": "viewer-password"})),
    )
    .await;
    assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);

    set_account_active(&mut *persistence.lock().await, "viewer", true).unwrap();
    let token: String = login_token(&app, "viewer", "viewer-password").await;
    let response: Response = send(&app, "GET", "/vendors/", Some(&token), None).await;
    assert_eq!(response.status(), HttpStatusCode::OK);
}

#[test]
fn test_set_account_active_unknown_user() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        set_account_active(&mut persistence, "ghost", false),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_args_bound_grace_period_and_session_hours() {
    let args: Args = Args::try_parse_from(["vms-server"]).unwrap();
    assert_eq!(args.grace_period_days, 7);
    assert_eq!(args.session_hours, 12);

    let args: Args =
        Args::try_parse_from(["vms-server", "--grace-period-days", "0", "--session-hours", "1"])
            .unwrap();
    assert_eq!(args.grace_period_days, 0);
    assert_eq!(args.session_hours, 1);

    for bad in [
        ["--grace-period-days", "-3"],
        ["--grace-period-days", "100000"],
        ["--session-hours", "0"],
        ["--session-hours", "100000000"],
    ] {
        assert!(
            Args::try_parse_from(["vms-server", bad[0], bad[1]]).is_err(),
            "{bad:?}"
        );
    }
}

#[test]
fn test_session_storage_failure_is_internal_error() {
    let storage: Response = SessionError::from(AuthError::Internal {
        message: String::from("disk I/O error"),
    })
    .into_response();
    assert_eq!(storage.status(), HttpStatusCode::INTERNAL_SERVER_ERROR);

    let refused: Response = SessionError::from(AuthError::AuthenticationFailed {
        reason: String::from("Session expired"),
    })
    .into_response();
    assert_eq!(refused.status(), HttpStatusCode::UNAUTHORIZED);
}
