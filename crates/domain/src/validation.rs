// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::{DomainError, FieldErrors};
use crate::metrics::VendorMetrics;
use crate::types::{PurchaseOrderDetails, PurchaseOrderStatus, VendorProfile};

/// Exact number of digits in a vendor's contact details.
pub const CONTACT_DETAILS_LENGTH: usize = 10;
/// Maximum length of a vendor name.
pub const MAX_VENDOR_NAME_LENGTH: usize = 100;
/// Maximum length of a vendor code.
pub const MAX_VENDOR_CODE_LENGTH: usize = 50;

/// Returns `true` if `value` is exactly [`CONTACT_DETAILS_LENGTH`] ASCII digits.
#[must_use]
pub fn is_valid_contact_details(value: &str) -> bool {
    value.len() == CONTACT_DETAILS_LENGTH && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validates the client-writable fields of a vendor.
///
/// Every rule is checked; all failures are reported together. Uniqueness
/// of the vendor code needs storage and is checked by the caller.
///
/// # Errors
///
/// Returns `DomainError::Validation` if:
/// - The name is empty or longer than 100 characters
/// - The contact details are not exactly 10 digits
/// - The address is empty
/// - The vendor code is empty or longer than 50 characters
pub fn validate_vendor_profile(profile: &VendorProfile) -> Result<(), DomainError> {
    let mut errors: FieldErrors = FieldErrors::new();

    // Rule: name is required and bounded
    if profile.name.trim().is_empty() {
        errors.add("name", "This field may not be blank.");
    } else if profile.name.chars().count() > MAX_VENDOR_NAME_LENGTH {
        errors.add(
            "name",
            format!("Ensure this field has no more than {MAX_VENDOR_NAME_LENGTH} characters."),
        );
    }

    // Rule: contact details are a fixed-length digit string
    if !is_valid_contact_details(&profile.contact_details) {
        errors.add(
            "contact_details",
            format!("Contact details must contain exactly {CONTACT_DETAILS_LENGTH} digits."),
        );
    }

    if profile.address.trim().is_empty() {
        errors.add("address", "This field may not be blank.");
    }

    if profile.vendor_code.trim().is_empty() {
        errors.add("vendor_code", "This field may not be blank.");
    } else if profile.vendor_code.chars().count() > MAX_VENDOR_CODE_LENGTH {
        errors.add(
            "vendor_code",
            format!("Ensure this field has no more than {MAX_VENDOR_CODE_LENGTH} characters."),
        );
    }

    errors.into_result()
}

/// Validates the client-writable fields of a purchase order.
///
/// # Errors
///
/// Returns `DomainError::Validation` if:
/// - The delivery date precedes the order date
/// - The quantity is less than one
/// - The quality rating is outside `[0, 5]`
pub fn validate_purchase_order_details(details: &PurchaseOrderDetails) -> Result<(), DomainError> {
    let mut errors: FieldErrors = FieldErrors::new();

    // Rule: delivery_date >= order_date
    if details.order_date > details.delivery_date {
        errors.add("delivery_date", "Delivery date must be after order date.");
    }

    if details.quantity < 1 {
        errors.add(
            "quantity",
            "Ensure this value is greater than or equal to 1.",
        );
    }

    if let Some(rating) = details.quality_rating {
        let (min, max): (f64, f64) = VendorMetrics::QUALITY_BOUNDS;
        if !(min..=max).contains(&rating) {
            errors.add(
                "quality_rating",
                format!("Ensure this value is between {min} and {max}."),
            );
        }
    }

    errors.into_result()
}

/// Validates a status change requested by a write.
///
/// # Errors
///
/// Returns `DomainError::Validation` on the `status` field if the transition
/// is not allowed.
pub fn validate_status_transition(
    current: PurchaseOrderStatus,
    requested: PurchaseOrderStatus,
) -> Result<(), DomainError> {
    if current.can_transition_to(requested) {
        return Ok(());
    }
    Err(DomainError::Validation(FieldErrors::single(
        "status",
        DomainError::InvalidStatusTransition {
            from: current.as_str(),
            to: requested.as_str(),
        }
        .to_string(),
    )))
}
