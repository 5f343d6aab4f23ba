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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod auth;
mod error;
mod handlers;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{
    AuthenticatedActor, AuthenticationService, AuthorizationService, Role, SessionTokens,
};
pub use error::{
    ApiError, AuthError, NON_FIELD_ERRORS, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    acknowledge_purchase_order, create_purchase_order, create_vendor, delete_purchase_order,
    delete_vendor, get_purchase_order, get_vendor, get_vendor_history, get_vendor_performance,
    list_purchase_orders, list_purchase_orders_by_vendor, list_vendors, login, logout,
    update_purchase_order, update_vendor,
};
pub use request_response::{
    AcknowledgeResponse, HistoricalPerformanceResponse, LoginRequest, LoginResponse,
    LogoutRequest, PurchaseOrderRequest, PurchaseOrderResponse, VendorRequest, VendorResponse,
};
