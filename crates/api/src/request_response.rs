// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Request fields are optional on the wire so that a missing field is
//! reported per field rather than as an unparseable body.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use vms_domain::{
    FieldErrors, HistoricalPerformance, PurchaseOrder, PurchaseOrderDetails, PurchaseOrderStatus,
    Vendor, VendorMetrics, VendorProfile, format_timestamp, parse_timestamp,
};

use crate::error::ApiError;

const REQUIRED: &str = "This field is required.";

/// API request to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The login name.
    pub username: String,
    /// The password.
    pub password: String,
}

/// API response for a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub access: String,
    /// Token to present on logout.
    pub refresh: String,
    /// The user's login name.
    pub username: String,
    /// The user's role.
    pub role: String,
    /// Session expiration timestamp (RFC 3339).
    pub expires_at: String,
}

/// API request to log out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// The refresh token issued at login.
    pub refresh: String,
}

/// API request to create or replace a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorRequest {
    pub name: Option<String>,
    pub contact_details: Option<String>,
    pub address: Option<String>,
    pub vendor_code: Option<String>,
}

impl VendorRequest {
    /// Converts the request into a vendor profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming every missing field.
    pub fn to_profile(&self) -> Result<VendorProfile, ApiError> {
        let mut errors: FieldErrors = FieldErrors::new();
        let name: String = required_text(&mut errors, "name", self.name.as_deref());
        let contact_details: String =
            required_text(&mut errors, "contact_details", self.contact_details.as_deref());
        let address: String = required_text(&mut errors, "address", self.address.as_deref());
        let vendor_code: String =
            required_text(&mut errors, "vendor_code", self.vendor_code.as_deref());

        if !errors.is_empty() {
            return Err(ApiError::Validation { fields: errors });
        }
        Ok(VendorProfile::new(name, contact_details, address, vendor_code))
    }
}

fn required_text(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_else(|| {
        errors.add(field, REQUIRED);
        String::new()
    })
}

/// API response describing a vendor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorResponse {
    pub id: i64,
    pub name: String,
    pub contact_details: String,
    pub address: String,
    pub vendor_code: String,
    pub on_time_delivery_rate: f64,
    pub quality_rating_avg: f64,
    pub average_response_time: f64,
    pub fulfillment_rate: f64,
}

impl VendorResponse {
    /// Builds a response from a vendor with the given metrics.
    #[must_use]
    pub fn with_metrics(vendor: &Vendor, metrics: &VendorMetrics) -> Self {
        Self {
            id: vendor.vendor_id,
            name: vendor.profile.name.clone(),
            contact_details: vendor.profile.contact_details.clone(),
            address: vendor.profile.address.clone(),
            vendor_code: vendor.profile.vendor_code.clone(),
            on_time_delivery_rate: metrics.on_time_delivery_rate(),
            quality_rating_avg: metrics.quality_rating_avg(),
            average_response_time: metrics.average_response_time(),
            fulfillment_rate: metrics.fulfillment_rate(),
        }
    }
}

impl From<&Vendor> for VendorResponse {
    fn from(vendor: &Vendor) -> Self {
        Self::with_metrics(vendor, &vendor.metrics)
    }
}

/// API request to create or replace a purchase order.
///
/// `po_number` is never read from the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseOrderRequest {
    pub vendor: Option<i64>,
    pub order_date: Option<String>,
    pub delivery_date: Option<String>,
    pub items: Option<serde_json::Value>,
    pub quantity: Option<i64>,
    pub status: Option<String>,
    pub quality_rating: Option<f64>,
}

impl PurchaseOrderRequest {
    /// Converts the request into purchase order details.
    ///
    /// A missing `status` defaults to `pending`. Domain rules such as date
    /// ordering are checked later by the lifecycle handler.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` naming every missing or malformed field.
    pub fn to_details(&self) -> Result<PurchaseOrderDetails, ApiError> {
        let mut errors: FieldErrors = FieldErrors::new();

        let vendor_id: Option<i64> = self.vendor;
        if vendor_id.is_none() {
            errors.add("vendor", REQUIRED);
        }
        let order_date: Option<OffsetDateTime> =
            required_timestamp(&mut errors, "order_date", self.order_date.as_deref());
        let delivery_date: Option<OffsetDateTime> =
            required_timestamp(&mut errors, "delivery_date", self.delivery_date.as_deref());

        // JSON null decodes to None, so an explicit null is reported as missing.
        let items: Option<serde_json::Value> = self.items.clone();
        if items.is_none() {
            errors.add("items", REQUIRED);
        }

        let quantity: Option<i32> = match self.quantity {
            None => {
                errors.add("quantity", REQUIRED);
                None
            }
            Some(value) => {
                let converted: Option<i32> = value.to_i32();
                if converted.is_none() {
                    errors.add(
                        "quantity",
                        format!("Ensure this value is less than or equal to {}.", i32::MAX),
                    );
                }
                converted
            }
        };

        let status: PurchaseOrderStatus = match self.status.as_deref() {
            None => PurchaseOrderStatus::default(),
            Some(value) => PurchaseOrderStatus::from_str(value).unwrap_or_else(|_| {
                errors.add("status", format!("\"{value}\" is not a valid choice."));
                PurchaseOrderStatus::default()
            }),
        };

        match (vendor_id, order_date, delivery_date, items, quantity) {
            (Some(vendor_id), Some(order_date), Some(delivery_date), Some(items), Some(quantity))
                if errors.is_empty() =>
            {
                Ok(PurchaseOrderDetails {
                    vendor_id,
                    order_date,
                    delivery_date,
                    items,
                    quantity,
                    status,
                    quality_rating: self.quality_rating,
                })
            }
            _ => Err(ApiError::Validation { fields: errors }),
        }
    }
}

fn required_timestamp(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<OffsetDateTime> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    match parse_timestamp(value) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.add(
                field,
                "Datetime has wrong format. Use RFC 3339 or YYYY-MM-DD.",
            );
            None
        }
    }
}

/// API response describing a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderResponse {
    pub id: i64,
    pub po_number: String,
    pub vendor: i64,
    pub order_date: String,
    pub delivery_date: String,
    pub items: serde_json::Value,
    pub quantity: i32,
    pub status: PurchaseOrderStatus,
    pub quality_rating: Option<f64>,
    pub issue_date: String,
    pub acknowledgment_date: Option<String>,
}

impl TryFrom<&PurchaseOrder> for PurchaseOrderResponse {
    type Error = ApiError;

    fn try_from(order: &PurchaseOrder) -> Result<Self, Self::Error> {
        let id: i64 = order.purchase_order_id.ok_or_else(|| ApiError::Internal {
            message: format!("Purchase order {} has no identifier", order.po_number),
        })?;
        Ok(Self {
            id,
            po_number: order.po_number.value().to_string(),
            vendor: order.vendor_id(),
            order_date: render_timestamp(order.details.order_date)?,
            delivery_date: render_timestamp(order.details.delivery_date)?,
            items: order.details.items.clone(),
            quantity: order.details.quantity,
            status: order.details.status,
            quality_rating: order.details.quality_rating,
            issue_date: render_timestamp(order.issue_date)?,
            acknowledgment_date: order
                .acknowledgment_date
                .map(render_timestamp)
                .transpose()?,
        })
    }
}

/// API response for an acknowledged purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
    /// A confirmation message.
    pub message: String,
    /// The recorded acknowledgment timestamp (RFC 3339).
    pub acknowledgment_date: String,
}

/// API response describing one performance snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPerformanceResponse {
    pub id: i64,
    pub vendor: i64,
    pub date: String,
    pub on_time_delivery_rate: f64,
    pub quality_rating_avg: f64,
    pub average_response_time: f64,
    pub fulfillment_rate: f64,
}

impl TryFrom<&HistoricalPerformance> for HistoricalPerformanceResponse {
    type Error = ApiError;

    fn try_from(snapshot: &HistoricalPerformance) -> Result<Self, Self::Error> {
        Ok(Self {
            id: snapshot.history_id,
            vendor: snapshot.vendor_id,
            date: render_timestamp(snapshot.recorded_at)?,
            on_time_delivery_rate: snapshot.metrics.on_time_delivery_rate(),
            quality_rating_avg: snapshot.metrics.quality_rating_avg(),
            average_response_time: snapshot.metrics.average_response_time(),
            fulfillment_rate: snapshot.metrics.fulfillment_rate(),
        })
    }
}

/// Formats a timestamp for a response body.
pub(crate) fn render_timestamp(value: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(value).map_err(|e| ApiError::Internal {
        message: e.to_string(),
    })
}
