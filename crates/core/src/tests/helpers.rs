// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::{Arc, Mutex};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use vms_domain::{
    MetricPolicy, PoNumber, PurchaseOrder, PurchaseOrderDetails, PurchaseOrderStatus, Vendor,
    VendorMetrics, VendorProfile,
};

use crate::{CoreError, LifecycleHandler, LifecycleObserver, MetricsRecalculation, TransitionResult};

/// Notifications captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Assigned { po_number: String, generated: bool },
    Applied(&'static str),
    Rejected(&'static str),
    Recalculated(MetricsRecalculation),
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: Recorded) {
        self.events.lock().unwrap().push(event);
    }
}

impl LifecycleObserver for RecordingObserver {
    fn po_number_assigned(&self, po_number: &PoNumber, generated: bool) {
        self.record(Recorded::Assigned {
            po_number: po_number.value().to_string(),
            generated,
        });
    }

    fn transition_applied(&self, result: &TransitionResult) {
        self.record(Recorded::Applied(result.action.as_str()));
    }

    fn transition_rejected(&self, command: &'static str, _error: &CoreError) {
        self.record(Recorded::Rejected(command));
    }

    fn metrics_recalculated(&self, recalculation: &MetricsRecalculation) {
        self.record(Recorded::Recalculated(*recalculation));
    }
}

pub fn create_test_handler() -> (LifecycleHandler, Arc<RecordingObserver>) {
    let observer: Arc<RecordingObserver> = Arc::new(RecordingObserver::default());
    let handler: LifecycleHandler =
        LifecycleHandler::new(MetricPolicy::default(), observer.clone());
    (handler, observer)
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2024-05-01 12:00 UTC)
}

pub fn create_test_vendor(vendor_id: i64) -> Vendor {
    Vendor {
        vendor_id,
        profile: VendorProfile::new(
            String::from("Test Vendor"),
            String::from("1234567890"),
            String::from("123 Main St"),
            format!("TEST{vendor_id}"),
        ),
        metrics: VendorMetrics::zero(),
    }
}

pub fn create_test_details(vendor_id: i64, status: PurchaseOrderStatus) -> PurchaseOrderDetails {
    PurchaseOrderDetails {
        vendor_id,
        order_date: datetime!(2024-05-01 0:00 UTC),
        delivery_date: datetime!(2024-05-10 0:00 UTC),
        items: serde_json::json!({"item1": 5, "item2": 10}),
        quantity: 15,
        status,
        quality_rating: None,
    }
}

/// A stored order issued at `test_now()`.
pub fn create_stored_order(
    purchase_order_id: i64,
    vendor_id: i64,
    status: PurchaseOrderStatus,
    delivery_offset_days: i64,
    quality_rating: Option<f64>,
) -> PurchaseOrder {
    let mut details: PurchaseOrderDetails = create_test_details(vendor_id, status);
    details.delivery_date = test_now() + Duration::days(delivery_offset_days);
    details.quality_rating = quality_rating;
    PurchaseOrder {
        purchase_order_id: Some(purchase_order_id),
        po_number: PoNumber::new(&format!("PO{purchase_order_id}")).unwrap(),
        details,
        issue_date: test_now(),
        acknowledgment_date: None,
    }
}
