// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{
        Path, State as AxumState,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use vms::LifecycleHandler;
use vms_api::{
    AcknowledgeResponse, ApiError, AuthenticationService, HistoricalPerformanceResponse,
    LoginRequest, LoginResponse, LogoutRequest, NON_FIELD_ERRORS, PurchaseOrderRequest,
    PurchaseOrderResponse, Role, VendorRequest, VendorResponse,
};
use vms_domain::{DEFAULT_ON_TIME_GRACE_DAYS, MetricPolicy, now_utc};
use vms_persistence::{Persistence, PersistenceError};

use crate::session::SessionUser;

/// Vendor Management Server - HTTP server for vendors and purchase orders
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Days after issue within which a delivery counts as on time
    #[arg(
        long,
        default_value_t = DEFAULT_ON_TIME_GRACE_DAYS,
        value_parser = clap::value_parser!(u32).range(0..=MAX_GRACE_PERIOD_DAYS)
    )]
    grace_period_days: u32,

    /// Lifetime of a login session, in hours
    #[arg(
        long,
        default_value_t = 12,
        value_parser = clap::value_parser!(i64).range(1..=MAX_SESSION_HOURS)
    )]
    session_hours: i64,

    /// Username of the admin account created when no users exist
    #[arg(long, requires = "admin_password")]
    admin_username: Option<String>,

    /// Password of the seeded admin account
    #[arg(long, requires = "admin_username")]
    admin_password: Option<String>,

    /// Disable an account at startup; its sessions stop working (repeatable)
    #[arg(long, value_name = "USERNAME")]
    disable_user: Vec<String>,

    /// Re-enable a disabled account at startup (repeatable)
    #[arg(long, value_name = "USERNAME")]
    enable_user: Vec<String>,
}

/// Upper bound for `--grace-period-days`.
const MAX_GRACE_PERIOD_DAYS: i64 = 3650;
/// Upper bound for `--session-hours`.
const MAX_SESSION_HOURS: i64 = 24 * 365;

/// Application state shared across handlers.
///
/// All database access goes through the single connection behind the
/// mutex, which also serializes purchase order writes and the metric
/// recomputation they trigger.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Applies purchase order commands and recomputes metrics.
    handler: LifecycleHandler,
    /// Issues and validates sessions.
    auth_service: AuthenticationService,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
    /// Messages keyed by field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
    /// Messages keyed by field.
    fields: Option<BTreeMap<String, Vec<String>>>,
}

impl HttpError {
    const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            fields: None,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::AuthenticationFailed { .. } => {
                Self::new(StatusCode::UNAUTHORIZED, err.to_string())
            }
            ApiError::Unauthorized { .. } => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            ApiError::Validation { ref fields } => Self {
                status: StatusCode::BAD_REQUEST,
                fields: Some(fields.as_map().clone()),
                message: err.to_string(),
            },
            ApiError::ResourceNotFound { .. } => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            ApiError::InvalidToken { .. } => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Rejected request body");
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        fields.insert(
            String::from(NON_FIELD_ERRORS),
            vec![rejection.body_text()],
        );
        Self {
            status: StatusCode::BAD_REQUEST,
            message: String::from("Malformed request body"),
            fields: Some(fields),
        }
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection.body_text(), "Rejected path parameter");
        Self::new(StatusCode::NOT_FOUND, String::from("Not found."))
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Handler for POST `/login/`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(req) = payload?;
    info!(username = %req.username, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse =
        vms_api::login(&mut persistence, &app_state.auth_service, &req, now_utc())?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/logout/`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<StatusCode, HttpError> {
    let Json(req) = payload?;

    let mut persistence = app_state.persistence.lock().await;
    vms_api::logout(&mut persistence, &actor, &req)?;
    drop(persistence);

    Ok(StatusCode::RESET_CONTENT)
}

// ============================================================================
// Vendors
// ============================================================================

/// Handler for GET `/vendors/`.
async fn handle_list_vendors(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
) -> Result<Json<Vec<VendorResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let vendors: Vec<VendorResponse> = vms_api::list_vendors(&mut persistence)?;
    Ok(Json(vendors))
}

/// Handler for POST `/vendors/`.
async fn handle_create_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    payload: Result<Json<VendorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<VendorResponse>), HttpError> {
    let Json(req) = payload?;

    let mut persistence = app_state.persistence.lock().await;
    let vendor: VendorResponse = vms_api::create_vendor(&mut persistence, &actor, &req)?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(vendor)))
}

/// Handler for GET `/vendors/{id}/`.
async fn handle_get_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<VendorResponse>, HttpError> {
    let Path(vendor_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let vendor: VendorResponse = vms_api::get_vendor(&mut persistence, vendor_id)?;
    Ok(Json(vendor))
}

/// Handler for PUT `/vendors/{id}/`.
async fn handle_update_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<VendorRequest>, JsonRejection>,
) -> Result<Json<VendorResponse>, HttpError> {
    let Path(vendor_id) = path?;
    let Json(req) = payload?;

    let mut persistence = app_state.persistence.lock().await;
    let vendor: VendorResponse =
        vms_api::update_vendor(&mut persistence, &actor, vendor_id, &req)?;
    Ok(Json(vendor))
}

/// Handler for DELETE `/vendors/{id}/`.
async fn handle_delete_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(vendor_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    vms_api::delete_vendor(&mut persistence, &actor, vendor_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/vendors/{id}/performance/`.
///
/// Returns metrics computed from the vendor's current orders.
async fn handle_vendor_performance(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<VendorResponse>, HttpError> {
    let Path(vendor_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let vendor: VendorResponse =
        vms_api::get_vendor_performance(&mut persistence, &app_state.handler, vendor_id)?;
    Ok(Json(vendor))
}

/// Handler for GET `/vendors/{id}/history/`.
async fn handle_vendor_history(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<HistoricalPerformanceResponse>>, HttpError> {
    let Path(vendor_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let history: Vec<HistoricalPerformanceResponse> =
        vms_api::get_vendor_history(&mut persistence, vendor_id)?;
    Ok(Json(history))
}

// ============================================================================
// Purchase Orders
// ============================================================================

/// Handler for GET `/purchase_orders/`.
async fn handle_list_purchase_orders(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
) -> Result<Json<Vec<PurchaseOrderResponse>>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let orders: Vec<PurchaseOrderResponse> = vms_api::list_purchase_orders(&mut persistence)?;
    Ok(Json(orders))
}

/// Handler for POST `/purchase_orders/`.
async fn handle_create_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    payload: Result<Json<PurchaseOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PurchaseOrderResponse>), HttpError> {
    let Json(req) = payload?;

    let mut persistence = app_state.persistence.lock().await;
    let order: PurchaseOrderResponse = vms_api::create_purchase_order(
        &mut persistence,
        &app_state.handler,
        &actor,
        &req,
        now_utc(),
    )?;
    drop(persistence);

    Ok((StatusCode::CREATED, Json(order)))
}

/// Handler for GET `/purchase_orders/{id}/`.
async fn handle_get_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<PurchaseOrderResponse>, HttpError> {
    let Path(purchase_order_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let order: PurchaseOrderResponse =
        vms_api::get_purchase_order(&mut persistence, purchase_order_id)?;
    Ok(Json(order))
}

/// Handler for PUT `/purchase_orders/{id}/`.
async fn handle_update_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PurchaseOrderRequest>, JsonRejection>,
) -> Result<Json<PurchaseOrderResponse>, HttpError> {
    let Path(purchase_order_id) = path?;
    let Json(req) = payload?;

    let mut persistence = app_state.persistence.lock().await;
    let order: PurchaseOrderResponse = vms_api::update_purchase_order(
        &mut persistence,
        &app_state.handler,
        &actor,
        purchase_order_id,
        &req,
        now_utc(),
    )?;
    Ok(Json(order))
}

/// Handler for DELETE `/purchase_orders/{id}/`.
async fn handle_delete_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(purchase_order_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    vms_api::delete_purchase_order(
        &mut persistence,
        &app_state.handler,
        &actor,
        purchase_order_id,
    )?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET `/purchase_orders/by_vendor/{vendor_id}/`.
async fn handle_list_purchase_orders_by_vendor(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Vec<PurchaseOrderResponse>>, HttpError> {
    let Path(vendor_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let orders: Vec<PurchaseOrderResponse> =
        vms_api::list_purchase_orders_by_vendor(&mut persistence, vendor_id)?;
    Ok(Json(orders))
}

/// Handler for PUT `/purchase_orders/{id}/acknowledge/`.
async fn handle_acknowledge_purchase_order(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor): SessionUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<AcknowledgeResponse>, HttpError> {
    let Path(purchase_order_id) = path?;
    let mut persistence = app_state.persistence.lock().await;
    let response: AcknowledgeResponse = vms_api::acknowledge_purchase_order(
        &mut persistence,
        &app_state.handler,
        &actor,
        purchase_order_id,
        now_utc(),
    )?;
    drop(persistence);

    info!(purchase_order_id, "Purchase order acknowledged");
    Ok(Json(response))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/login/", post(handle_login))
        .route("/logout/", post(handle_logout))
        .route(
            "/vendors/",
            get(handle_list_vendors).post(handle_create_vendor),
        )
        .route(
            "/vendors/{id}/",
            get(handle_get_vendor)
                .put(handle_update_vendor)
                .delete(handle_delete_vendor),
        )
        .route("/vendors/{id}/performance/", get(handle_vendor_performance))
        .route("/vendors/{id}/history/", get(handle_vendor_history))
        .route(
            "/purchase_orders/",
            get(handle_list_purchase_orders).post(handle_create_purchase_order),
        )
        .route(
            "/purchase_orders/{id}/",
            get(handle_get_purchase_order)
                .put(handle_update_purchase_order)
                .delete(handle_delete_purchase_order),
        )
        .route(
            "/purchase_orders/by_vendor/{vendor_id}/",
            get(handle_list_purchase_orders_by_vendor),
        )
        .route(
            "/purchase_orders/{id}/acknowledge/",
            put(handle_acknowledge_purchase_order),
        )
        .with_state(app_state)
}

/// Creates the initial admin account when the database has no users.
fn seed_admin(
    persistence: &mut Persistence,
    username: &str,
    password: &str,
) -> Result<(), PersistenceError> {
    let user_count: i64 = persistence.count_users()?;
    if user_count > 0 {
        info!(user_count, "Users already exist, skipping admin seed");
        return Ok(());
    }
    let user_id: i64 = persistence.create_user(username, password, Role::Admin.as_str())?;
    info!(user_id, username, "Seeded admin account");
    Ok(())
}

/// Enables or disables an existing account.
fn set_account_active(
    persistence: &mut Persistence,
    username: &str,
    active: bool,
) -> Result<(), PersistenceError> {
    let user_id: i64 = persistence
        .get_user_by_username(username)?
        .ok_or_else(|| PersistenceError::NotFound(format!("User '{username}'")))?
        .user_id;
    persistence.set_user_active(user_id, active)?;
    info!(user_id, username, active, "Updated account status");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Vendor Management Server");

    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    if let (Some(username), Some(password)) = (&args.admin_username, &args.admin_password) {
        seed_admin(&mut persistence, username, password)?;
    }
    for username in &args.disable_user {
        set_account_active(&mut persistence, username, false)?;
    }
    for username in &args.enable_user {
        set_account_active(&mut persistence, username, true)?;
    }

    let policy: MetricPolicy = MetricPolicy::with_grace_days(args.grace_period_days);
    info!(
        grace_period_days = args.grace_period_days,
        session_hours = args.session_hours,
        "Configured metric policy and sessions"
    );

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        handler: LifecycleHandler::with_tracing(policy),
        auth_service: AuthenticationService::new(Duration::hours(args.session_hours)),
    };

    let app: Router = build_router(app_state);

    let listener: tokio::net::TcpListener =
        tokio::net::TcpListener::bind((args.bind.as_str(), args.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
