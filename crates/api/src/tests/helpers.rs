// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use serde_json::json;
use time::OffsetDateTime;
use time::macros::datetime;
use vms::LifecycleHandler;
use vms_domain::MetricPolicy;
use vms_persistence::Persistence;

use crate::{
    AuthenticatedActor, PurchaseOrderRequest, PurchaseOrderResponse, Role, VendorRequest,
    VendorResponse, create_purchase_order, create_vendor,
};

pub fn setup_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create in-memory persistence")
}

pub fn create_test_handler() -> LifecycleHandler {
    LifecycleHandler::with_tracing(MetricPolicy::default())
}

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(1, String::from("admin"), Role::Admin)
}

pub fn create_test_viewer() -> AuthenticatedActor {
    AuthenticatedActor::new(2, String::from("viewer"), Role::Viewer)
}

/// Noon on 2024-05-01, used as the issue date of created orders.
pub const fn test_now() -> OffsetDateTime {
    datetime!(2024-05-01 12:00 UTC)
}

pub fn create_vendor_request(vendor_code: &str) -> VendorRequest {
    VendorRequest {
        name: Some(String::from("Acme Supplies")),
        contact_details: Some(String::from("5551234567")),
        address: Some(String::from("1 Industrial Way")),
        vendor_code: Some(vendor_code.to_string()),
    }
}

/// An order placed on 2024-05-01 and delivered `delivery_day` of May.
pub fn create_order_request(
    vendor_id: i64,
    delivery_day: u8,
    status: &str,
    quality_rating: Option<f64>,
) -> PurchaseOrderRequest {
    PurchaseOrderRequest {
        vendor: Some(vendor_id),
        order_date: Some(String::from("2024-05-01T00:00:00Z")),
        delivery_date: Some(format!("2024-05-{delivery_day:02}T12:00:00Z")),
        items: Some(json!([{"sku": "BOLT-10", "count": 40}])),
        quantity: Some(40),
        status: Some(status.to_string()),
        quality_rating,
    }
}

pub fn setup_vendor(persistence: &mut Persistence, vendor_code: &str) -> VendorResponse {
    create_vendor(
        persistence,
        &create_test_admin(),
        &create_vendor_request(vendor_code),
    )
    .expect("Failed to create vendor")
}

pub fn setup_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    request: &PurchaseOrderRequest,
) -> PurchaseOrderResponse {
    create_purchase_order(
        persistence,
        handler,
        &create_test_admin(),
        request,
        test_now(),
    )
    .expect("Failed to create purchase order")
}
