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

mod error;
mod metrics;
mod timestamp;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use error::{DomainError, FieldErrors};
pub use metrics::{
    DEFAULT_ON_TIME_GRACE_DAYS, MetricPolicy, VendorMetrics, average_response_time,
    compute_vendor_metrics, fulfillment_rate, on_time_delivery_rate, quality_rating_average,
    round_hundredths,
};
pub use timestamp::{format_timestamp, normalize_timestamp, now_utc, parse_timestamp};
pub use types::{
    HistoricalPerformance, PoNumber, PurchaseOrder, PurchaseOrderDetails, PurchaseOrderStatus,
    Vendor, VendorProfile,
};
pub use validation::{
    CONTACT_DETAILS_LENGTH, MAX_VENDOR_CODE_LENGTH, MAX_VENDOR_NAME_LENGTH,
    is_valid_contact_details, validate_purchase_order_details, validate_status_transition,
    validate_vendor_profile,
};
