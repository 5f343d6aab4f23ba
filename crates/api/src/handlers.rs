// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler is synchronous and takes the persistence layer by mutable
//! reference. The server serializes access to it.

use time::OffsetDateTime;
use tracing::{debug, info};
use vms::{Command, LifecycleHandler, MetricsRecalculation, TransitionResult};
use vms_domain::{
    HistoricalPerformance, PurchaseOrder, PurchaseOrderDetails, Vendor, VendorProfile,
    validate_vendor_profile,
};
use vms_persistence::{Persistence, PersistenceError, PurchaseOrderWriteOutcome};

use crate::auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, SessionTokens};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AcknowledgeResponse, HistoricalPerformanceResponse, LoginRequest, LoginResponse,
    LogoutRequest, PurchaseOrderRequest, PurchaseOrderResponse, VendorRequest, VendorResponse,
    render_timestamp,
};

// ============================================================================
// Authentication
// ============================================================================

/// Logs a user in and issues a session.
///
/// # Errors
///
/// Returns `ApiError::AuthenticationFailed` for bad credentials or an
/// inactive account.
pub fn login(
    persistence: &mut Persistence,
    auth_service: &AuthenticationService,
    request: &LoginRequest,
    now: OffsetDateTime,
) -> Result<LoginResponse, ApiError> {
    let (tokens, actor): (SessionTokens, AuthenticatedActor) =
        auth_service.login(persistence, &request.username, &request.password, now)?;

    Ok(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        username: actor.username,
        role: String::from(actor.role.as_str()),
        expires_at: render_timestamp(tokens.expires_at)?,
    })
}

/// Logs the actor out by blacklisting their refresh token.
///
/// # Errors
///
/// Returns `ApiError::InvalidToken` if the token is unknown or belongs to
/// someone else.
pub fn logout(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &LogoutRequest,
) -> Result<(), ApiError> {
    AuthenticationService::logout(persistence, actor, &request.refresh)?;
    Ok(())
}

// ============================================================================
// Vendors
// ============================================================================

/// Lists all vendors.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vendors(persistence: &mut Persistence) -> Result<Vec<VendorResponse>, ApiError> {
    let vendors: Vec<Vendor> = persistence
        .list_vendors()
        .map_err(translate_persistence_error)?;
    Ok(vendors.iter().map(VendorResponse::from).collect())
}

/// Creates a vendor with zero metrics.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A field is missing or invalid
/// - The vendor code is already in use
pub fn create_vendor(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    request: &VendorRequest,
) -> Result<VendorResponse, ApiError> {
    AuthorizationService::authorize_write(actor, "create_vendor")?;

    let profile: VendorProfile = request.to_profile()?;
    validate_vendor_profile(&profile).map_err(translate_domain_error)?;
    ensure_vendor_code_available(persistence, &profile.vendor_code, None)?;

    let vendor: Vendor = persistence
        .create_vendor(&profile)
        .map_err(vendor_write_error)?;

    info!(
        vendor_id = vendor.vendor_id,
        vendor_code = %vendor.profile.vendor_code,
        actor = %actor.username,
        "Vendor created"
    );
    Ok(VendorResponse::from(&vendor))
}

/// Retrieves a vendor with its stored metrics.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the vendor does not exist.
pub fn get_vendor(
    persistence: &mut Persistence,
    vendor_id: i64,
) -> Result<VendorResponse, ApiError> {
    let vendor: Vendor = require_vendor(persistence, vendor_id)?;
    Ok(VendorResponse::from(&vendor))
}

/// Replaces the client-writable fields of a vendor.
///
/// Metrics are not client-writable and stay as stored.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The vendor does not exist
/// - A field is missing or invalid
/// - The vendor code belongs to another vendor
pub fn update_vendor(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    vendor_id: i64,
    request: &VendorRequest,
) -> Result<VendorResponse, ApiError> {
    AuthorizationService::authorize_write(actor, "update_vendor")?;
    require_vendor(persistence, vendor_id)?;

    let profile: VendorProfile = request.to_profile()?;
    validate_vendor_profile(&profile).map_err(translate_domain_error)?;
    ensure_vendor_code_available(persistence, &profile.vendor_code, Some(vendor_id))?;

    let vendor: Vendor = persistence
        .update_vendor_profile(vendor_id, &profile)
        .map_err(vendor_write_error)?;

    info!(vendor_id, actor = %actor.username, "Vendor updated");
    Ok(VendorResponse::from(&vendor))
}

/// Deletes a vendor together with its orders and history.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the vendor does not
/// exist.
pub fn delete_vendor(
    persistence: &mut Persistence,
    actor: &AuthenticatedActor,
    vendor_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_write(actor, "delete_vendor")?;
    persistence
        .delete_vendor(vendor_id)
        .map_err(translate_persistence_error)?;
    info!(vendor_id, actor = %actor.username, "Vendor deleted");
    Ok(())
}

/// Returns a vendor with metrics computed from its current orders.
///
/// The computed metrics are not stored.
///
/// # Errors
///
/// Returns an error if the vendor does not exist or a stored order yields
/// an out-of-range metric.
pub fn get_vendor_performance(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    vendor_id: i64,
) -> Result<VendorResponse, ApiError> {
    let vendor: Vendor = require_vendor(persistence, vendor_id)?;
    let orders: Vec<PurchaseOrder> = persistence
        .list_purchase_orders_for_vendor(vendor_id)
        .map_err(translate_persistence_error)?;

    let recalculation: MetricsRecalculation = handler
        .recalculate(&vendor, &orders)
        .map_err(translate_core_error)?;

    debug!(
        vendor_id,
        orders = orders.len(),
        stale = recalculation.changed(),
        "Computed vendor performance"
    );
    Ok(VendorResponse::with_metrics(&vendor, &recalculation.after))
}

/// Lists the performance snapshots of a vendor, oldest first.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the vendor does not exist.
pub fn get_vendor_history(
    persistence: &mut Persistence,
    vendor_id: i64,
) -> Result<Vec<HistoricalPerformanceResponse>, ApiError> {
    require_vendor(persistence, vendor_id)?;
    let history: Vec<HistoricalPerformance> = persistence
        .list_performance_history(vendor_id)
        .map_err(translate_persistence_error)?;
    history
        .iter()
        .map(HistoricalPerformanceResponse::try_from)
        .collect()
}

// ============================================================================
// Purchase Orders
// ============================================================================

/// Lists all purchase orders.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_purchase_orders(
    persistence: &mut Persistence,
) -> Result<Vec<PurchaseOrderResponse>, ApiError> {
    let orders: Vec<PurchaseOrder> = persistence
        .list_purchase_orders()
        .map_err(translate_persistence_error)?;
    orders.iter().map(PurchaseOrderResponse::try_from).collect()
}

/// Lists the purchase orders of one vendor.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the vendor does not exist.
pub fn list_purchase_orders_by_vendor(
    persistence: &mut Persistence,
    vendor_id: i64,
) -> Result<Vec<PurchaseOrderResponse>, ApiError> {
    require_vendor(persistence, vendor_id)?;
    let orders: Vec<PurchaseOrder> = persistence
        .list_purchase_orders_for_vendor(vendor_id)
        .map_err(translate_persistence_error)?;
    orders.iter().map(PurchaseOrderResponse::try_from).collect()
}

/// Creates a purchase order and recomputes its vendor's metrics.
///
/// A purchase order number is always generated.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A field is missing or invalid
/// - The referenced vendor does not exist
/// - Recomputation fails, in which case nothing is stored
pub fn create_purchase_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    actor: &AuthenticatedActor,
    request: &PurchaseOrderRequest,
    now: OffsetDateTime,
) -> Result<PurchaseOrderResponse, ApiError> {
    AuthorizationService::authorize_write(actor, "create_purchase_order")?;

    let details: PurchaseOrderDetails = request.to_details()?;
    require_referenced_vendor(persistence, details.vendor_id)?;

    let command: Command = Command::CreatePurchaseOrder {
        po_number: None,
        details,
    };
    let outcome: PurchaseOrderWriteOutcome =
        write_transition(persistence, handler, None, command, now)?;
    PurchaseOrderResponse::try_from(&outcome.purchase_order)
}

/// Retrieves a purchase order.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the order does not exist.
pub fn get_purchase_order(
    persistence: &mut Persistence,
    purchase_order_id: i64,
) -> Result<PurchaseOrderResponse, ApiError> {
    let order: PurchaseOrder = require_purchase_order(persistence, purchase_order_id)?;
    PurchaseOrderResponse::try_from(&order)
}

/// Replaces the client-writable fields of a purchase order.
///
/// The number, issue date and acknowledgment date are kept.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The order does not exist
/// - A field is missing or invalid, or the status regresses
/// - The referenced vendor does not exist
/// - Recomputation fails, in which case nothing is stored
pub fn update_purchase_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    actor: &AuthenticatedActor,
    purchase_order_id: i64,
    request: &PurchaseOrderRequest,
    now: OffsetDateTime,
) -> Result<PurchaseOrderResponse, ApiError> {
    AuthorizationService::authorize_write(actor, "update_purchase_order")?;
    let current: PurchaseOrder = require_purchase_order(persistence, purchase_order_id)?;

    let details: PurchaseOrderDetails = request.to_details()?;
    require_referenced_vendor(persistence, details.vendor_id)?;

    let command: Command = Command::UpdatePurchaseOrder { details };
    let outcome: PurchaseOrderWriteOutcome =
        write_transition(persistence, handler, Some(&current), command, now)?;
    PurchaseOrderResponse::try_from(&outcome.purchase_order)
}

/// Deletes a purchase order and recomputes its vendor's metrics.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the order does not exist
/// or recomputation fails.
pub fn delete_purchase_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    actor: &AuthenticatedActor,
    purchase_order_id: i64,
) -> Result<(), ApiError> {
    AuthorizationService::authorize_write(actor, "delete_purchase_order")?;
    let recalculation: MetricsRecalculation = persistence
        .delete_purchase_order(handler, purchase_order_id)
        .map_err(translate_persistence_error)?;
    info!(
        purchase_order_id,
        vendor_id = recalculation.vendor_id,
        actor = %actor.username,
        "Purchase order deleted"
    );
    Ok(())
}

/// Records the vendor's acknowledgment of a purchase order.
///
/// Status is left unchanged. A repeated acknowledgment overwrites the
/// stored timestamp.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the order does not exist
/// or recomputation fails.
pub fn acknowledge_purchase_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    actor: &AuthenticatedActor,
    purchase_order_id: i64,
    now: OffsetDateTime,
) -> Result<AcknowledgeResponse, ApiError> {
    AuthorizationService::authorize_write(actor, "acknowledge_purchase_order")?;
    let current: PurchaseOrder = require_purchase_order(persistence, purchase_order_id)?;

    let outcome: PurchaseOrderWriteOutcome = write_transition(
        persistence,
        handler,
        Some(&current),
        Command::AcknowledgePurchaseOrder,
        now,
    )?;

    let acknowledged_at: OffsetDateTime = outcome
        .purchase_order
        .acknowledgment_date
        .ok_or_else(|| ApiError::Internal {
            message: format!("Purchase order {purchase_order_id} was not acknowledged"),
        })?;

    Ok(AcknowledgeResponse {
        message: format!(
            "Purchase order {} acknowledged",
            outcome.purchase_order.po_number
        ),
        acknowledgment_date: render_timestamp(acknowledged_at)?,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn write_transition(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    current: Option<&PurchaseOrder>,
    command: Command,
    now: OffsetDateTime,
) -> Result<PurchaseOrderWriteOutcome, ApiError> {
    let result: TransitionResult = handler
        .apply(current, command, now)
        .map_err(translate_core_error)?;
    persistence
        .apply_purchase_order_transition(handler, &result)
        .map_err(translate_persistence_error)
}

fn require_vendor(persistence: &mut Persistence, vendor_id: i64) -> Result<Vendor, ApiError> {
    persistence
        .get_vendor(vendor_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("Vendor", vendor_id))
}

fn require_purchase_order(
    persistence: &mut Persistence,
    purchase_order_id: i64,
) -> Result<PurchaseOrder, ApiError> {
    persistence
        .get_purchase_order(purchase_order_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::not_found("PurchaseOrder", purchase_order_id))
}

/// A vendor referenced from a request body is a field error, not a 404.
fn require_referenced_vendor(
    persistence: &mut Persistence,
    vendor_id: i64,
) -> Result<(), ApiError> {
    let vendor: Option<Vendor> = persistence
        .get_vendor(vendor_id)
        .map_err(translate_persistence_error)?;
    if vendor.is_none() {
        return Err(unknown_vendor_reference(vendor_id));
    }
    Ok(())
}

fn unknown_vendor_reference(vendor_id: i64) -> ApiError {
    ApiError::invalid_field(
        "vendor",
        format!("Invalid pk \"{vendor_id}\" - object does not exist."),
    )
}

fn ensure_vendor_code_available(
    persistence: &mut Persistence,
    vendor_code: &str,
    current_vendor_id: Option<i64>,
) -> Result<(), ApiError> {
    let existing: Option<Vendor> = persistence
        .get_vendor_by_code(vendor_code)
        .map_err(translate_persistence_error)?;
    match existing {
        Some(vendor) if Some(vendor.vendor_id) != current_vendor_id => {
            Err(duplicate_vendor_code())
        }
        _ => Ok(()),
    }
}

fn duplicate_vendor_code() -> ApiError {
    ApiError::invalid_field("vendor_code", "vendor with this vendor code already exists.")
}

fn vendor_write_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(_) => duplicate_vendor_code(),
        other => translate_persistence_error(other),
    }
}
