// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]


use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use vms::{Command, LifecycleHandler, TransitionResult};
use vms_domain::{
    MetricPolicy, PurchaseOrderDetails, PurchaseOrderStatus, Vendor, VendorProfile,
};

use crate::{Persistence, PurchaseOrderWriteOutcome};

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().unwrap()
}

pub fn create_test_handler() -> LifecycleHandler {
    LifecycleHandler::with_tracing(MetricPolicy::default())
}

pub fn create_test_profile(vendor_code: &str) -> VendorProfile {
    VendorProfile::new(
        String::from("Test Vendor"),
        String::from("1234567890"),
        String::from("123 Main St"),
        vendor_code.to_string(),
    )
}

pub fn create_test_vendor(persistence: &mut Persistence, vendor_code: &str) -> Vendor {
    persistence
        .create_vendor(&create_test_profile(vendor_code))
        .unwrap()
}

pub fn test_order_date() -> OffsetDateTime {
    datetime!(2024-05-01 0:00 UTC)
}

pub fn create_test_details(vendor_id: i64, status: PurchaseOrderStatus) -> PurchaseOrderDetails {
    PurchaseOrderDetails {
        vendor_id,
        order_date: test_order_date(),
        delivery_date: test_order_date() + Duration::days(2),
        items: serde_json::json!({"item1": 5, "item2": 10}),
        quantity: 15,
        status,
        quality_rating: None,
    }
}

/// Runs a create command through the handler and persists it.
pub fn create_test_order(
    persistence: &mut Persistence,
    handler: &LifecycleHandler,
    details: PurchaseOrderDetails,
    now: OffsetDateTime,
) -> PurchaseOrderWriteOutcome {
    let result: TransitionResult = handler
        .apply(
            None,
            Command::CreatePurchaseOrder {
                po_number: None,
                details,
            },
            now,
        )
        .unwrap();
    persistence
        .apply_purchase_order_transition(handler, &result)
        .unwrap()
}
