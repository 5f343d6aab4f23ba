// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]


use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use crate::{PoNumber, PurchaseOrder, PurchaseOrderDetails, PurchaseOrderStatus, VendorProfile};

pub const TEST_VENDOR_ID: i64 = 1;

pub fn test_issue_date() -> OffsetDateTime {
    datetime!(2024-04-30 09:00 UTC)
}

pub fn create_test_profile() -> VendorProfile {
    VendorProfile::new(
        String::from("Test Vendor"),
        String::from("1234567890"),
        String::from("123 Main St"),
        String::from("TEST123"),
    )
}

pub fn create_test_details(status: PurchaseOrderStatus) -> PurchaseOrderDetails {
    PurchaseOrderDetails {
        vendor_id: TEST_VENDOR_ID,
        order_date: test_issue_date(),
        delivery_date: test_issue_date() + Duration::days(2),
        items: serde_json::json!({"widget": 4}),
        quantity: 10,
        status,
        quality_rating: None,
    }
}

/// Builds an order issued at `test_issue_date()` and delivered
/// `delivery_offset_days` later.
pub fn create_test_order(
    status: PurchaseOrderStatus,
    delivery_offset_days: i64,
    quality_rating: Option<f64>,
    acknowledged_after_days: Option<i64>,
) -> PurchaseOrder {
    let mut details: PurchaseOrderDetails = create_test_details(status);
    details.delivery_date = test_issue_date() + Duration::days(delivery_offset_days);
    details.quality_rating = quality_rating;

    PurchaseOrder {
        purchase_order_id: None,
        po_number: PoNumber::new("PO123").unwrap(),
        details,
        issue_date: test_issue_date(),
        acknowledgment_date: acknowledged_after_days
            .map(|days| test_issue_date() + Duration::days(days)),
    }
}
