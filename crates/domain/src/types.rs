// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, OffsetDateTime};

use crate::error::DomainError;
use crate::metrics::VendorMetrics;

/// Lifecycle status of a purchase order.
///
/// Orders start out `Pending` and may move to `Completed`. The reverse
/// transition is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    /// The order has been placed but not fulfilled.
    #[default]
    Pending,
    /// The order has been fulfilled.
    Completed,
}

impl FromStr for PurchaseOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl PurchaseOrderStatus {
    /// Converts this status to its wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    /// Checks if a write may move an order from this status to `target`.
    ///
    /// Rewriting the same status is always allowed.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Pending | Self::Completed) | (Self::Completed, Self::Completed)
        )
    }

    /// Returns whether the order counts as fulfilled.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A unique purchase order number.
///
/// Numbers supplied by the system follow `YYMMDD-<10 hex chars>`. Numbers
/// loaded from storage are accepted as-is provided they fit the column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoNumber {
    value: String,
}

impl PoNumber {
    /// Maximum stored length.
    pub const MAX_LENGTH: usize = 50;
    /// Number of hex characters after the date prefix.
    pub const SUFFIX_LENGTH: usize = 10;
    const SUFFIX_MASK: u64 = 0xFF_FFFF_FFFF;

    /// Creates a purchase order number from an existing value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPoNumber` if the value is empty or longer
    /// than [`Self::MAX_LENGTH`].
    pub fn new(value: &str) -> Result<Self, DomainError> {
        let trimmed: &str = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidPoNumber(String::from(
                "Purchase order number cannot be empty",
            )));
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(DomainError::InvalidPoNumber(format!(
                "Purchase order number cannot exceed {} characters",
                Self::MAX_LENGTH
            )));
        }
        Ok(Self {
            value: trimmed.to_string(),
        })
    }

    /// Generates a number from a calendar date and 40 bits of entropy.
    ///
    /// Only the low 40 bits of `entropy` are used.
    #[must_use]
    pub fn generate(date: Date, entropy: u64) -> Self {
        let suffix: u64 = entropy & Self::SUFFIX_MASK;
        Self {
            value: format!(
                "{:02}{:02}{:02}-{suffix:010x}",
                date.year().rem_euclid(100),
                u8::from(date.month()),
                date.day()
            ),
        }
    }

    /// Returns the number as text.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns whether this number has the system-generated shape.
    #[must_use]
    pub fn is_generated_format(&self) -> bool {
        let Some((prefix, suffix)) = self.value.split_once('-') else {
            return false;
        };
        prefix.len() == 6
            && prefix.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == Self::SUFFIX_LENGTH
            && suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
}

impl std::fmt::Display for PoNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The client-writable fields of a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorProfile {
    /// Display name.
    pub name: String,
    /// Contact phone number, exactly ten digits.
    pub contact_details: String,
    /// Postal address.
    pub address: String,
    /// Unique vendor code.
    pub vendor_code: String,
}

impl VendorProfile {
    /// Creates a new `VendorProfile`.
    #[must_use]
    pub const fn new(
        name: String,
        contact_details: String,
        address: String,
        vendor_code: String,
    ) -> Self {
        Self {
            name,
            contact_details,
            address,
            vendor_code,
        }
    }
}

/// A persisted vendor together with its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct Vendor {
    /// The identifier assigned by the database.
    pub vendor_id: i64,
    /// The client-writable fields.
    pub profile: VendorProfile,
    /// The derived metrics as last recomputed.
    pub metrics: VendorMetrics,
}

/// The client-writable fields of a purchase order.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderDetails {
    /// The owning vendor.
    pub vendor_id: i64,
    /// When the order was placed.
    pub order_date: OffsetDateTime,
    /// When the order was (or is to be) delivered.
    pub delivery_date: OffsetDateTime,
    /// Arbitrary line-item payload.
    pub items: serde_json::Value,
    /// Ordered quantity, at least one.
    pub quantity: i32,
    /// Lifecycle status.
    pub status: PurchaseOrderStatus,
    /// Optional quality rating in `[0, 5]`.
    pub quality_rating: Option<f64>,
}

/// A purchase order.
///
/// `purchase_order_id` is `None` until the order has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrder {
    /// The identifier assigned by the database.
    pub purchase_order_id: Option<i64>,
    /// The unique order number.
    pub po_number: PoNumber,
    /// The client-writable fields.
    pub details: PurchaseOrderDetails,
    /// Set once when the order is created.
    pub issue_date: OffsetDateTime,
    /// Set by the acknowledge action.
    pub acknowledgment_date: Option<OffsetDateTime>,
}

impl PurchaseOrder {
    /// Returns the owning vendor's identifier.
    #[must_use]
    pub const fn vendor_id(&self) -> i64 {
        self.details.vendor_id
    }

    /// Returns whether the order is completed.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.details.status.is_completed()
    }
}

/// An append-only snapshot of a vendor's metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalPerformance {
    /// The identifier assigned by the database.
    pub history_id: i64,
    /// The vendor the snapshot belongs to.
    pub vendor_id: i64,
    /// When the snapshot was taken.
    pub recorded_at: OffsetDateTime,
    /// The metrics at that time.
    pub metrics: VendorMetrics,
}
