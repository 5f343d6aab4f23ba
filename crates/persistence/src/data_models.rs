// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use std::str::FromStr;
use vms::MetricsRecalculation;
use vms_domain::{
    HistoricalPerformance, PoNumber, PurchaseOrder, PurchaseOrderDetails, PurchaseOrderStatus,
    Vendor, VendorMetrics, VendorProfile, parse_timestamp,
};

use crate::diesel_schema::{historical_performances, purchase_orders, sessions, users, vendors};
use crate::error::PersistenceError;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    pub user_id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

/// A stored login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub session_id: i64,
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// The result of a purchase order write.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseOrderWriteOutcome {
    /// The order as stored, with its identifier.
    pub purchase_order: PurchaseOrder,
    /// One entry per recomputed vendor, in recomputation order.
    pub recalculations: Vec<MetricsRecalculation>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
    role: String,
    is_active: i32,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            password_hash: row.password_hash,
            role: row.role,
            is_active: row.is_active != 0,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
pub(crate) struct SessionRow {
    session_id: i64,
    access_token: String,
    refresh_token: String,
    user_id: i64,
    created_at: String,
    expires_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = vendors)]
pub(crate) struct VendorRow {
    vendor_id: i64,
    name: String,
    contact_details: String,
    address: String,
    vendor_code: String,
    on_time_delivery_rate: f64,
    quality_rating_avg: f64,
    average_response_time: f64,
    fulfillment_rate: f64,
}

impl TryFrom<VendorRow> for Vendor {
    type Error = PersistenceError;

    fn try_from(row: VendorRow) -> Result<Self, Self::Error> {
        let metrics: VendorMetrics = VendorMetrics::new(
            row.on_time_delivery_rate,
            row.quality_rating_avg,
            row.average_response_time,
            row.fulfillment_rate,
        )?;
        Ok(Self {
            vendor_id: row.vendor_id,
            profile: VendorProfile::new(
                row.name,
                row.contact_details,
                row.address,
                row.vendor_code,
            ),
            metrics,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = purchase_orders)]
pub(crate) struct PurchaseOrderRow {
    purchase_order_id: i64,
    po_number: String,
    vendor_id: i64,
    order_date: String,
    delivery_date: String,
    items: String,
    quantity: i32,
    status: String,
    quality_rating: Option<f64>,
    issue_date: String,
    acknowledgment_date: Option<String>,
}

impl TryFrom<PurchaseOrderRow> for PurchaseOrder {
    type Error = PersistenceError;

    // Stored orders are not re-validated; a corrupt rating surfaces when
    // metrics are recomputed.
    fn try_from(row: PurchaseOrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            purchase_order_id: Some(row.purchase_order_id),
            po_number: PoNumber::new(&row.po_number)?,
            details: PurchaseOrderDetails {
                vendor_id: row.vendor_id,
                order_date: parse_timestamp(&row.order_date)?,
                delivery_date: parse_timestamp(&row.delivery_date)?,
                items: serde_json::from_str(&row.items)?,
                quantity: row.quantity,
                status: PurchaseOrderStatus::from_str(&row.status)?,
                quality_rating: row.quality_rating,
            },
            issue_date: parse_timestamp(&row.issue_date)?,
            acknowledgment_date: row
                .acknowledgment_date
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = historical_performances)]
pub(crate) struct HistoricalPerformanceRow {
    history_id: i64,
    vendor_id: i64,
    recorded_at: String,
    on_time_delivery_rate: f64,
    quality_rating_avg: f64,
    average_response_time: f64,
    fulfillment_rate: f64,
}

impl TryFrom<HistoricalPerformanceRow> for HistoricalPerformance {
    type Error = PersistenceError;

    fn try_from(row: HistoricalPerformanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            history_id: row.history_id,
            vendor_id: row.vendor_id,
            recorded_at: parse_timestamp(&row.recorded_at)?,
            metrics: VendorMetrics::new(
                row.on_time_delivery_rate,
                row.quality_rating_avg,
                row.average_response_time,
                row.fulfillment_rate,
            )?,
        })
    }
}
