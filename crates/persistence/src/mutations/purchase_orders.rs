// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Purchase order writes.
//!
//! Every write recomputes the metrics of each affected vendor, stores them
//! and appends a history snapshot inside the same transaction. If any step
//! fails the whole write is rolled back.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use vms::{LifecycleHandler, MetricsRecalculation, TransitionResult};
use vms_domain::{PurchaseOrder, PurchaseOrderDetails, Vendor, format_timestamp, now_utc};

use crate::backend::sqlite::last_insert_rowid;
use crate::data_models::PurchaseOrderWriteOutcome;
use crate::diesel_schema::purchase_orders;
use crate::error::PersistenceError;
use crate::mutations::vendors::{insert_performance_snapshot, update_vendor_metrics};
use crate::queries::purchase_orders::{get_purchase_order, list_purchase_orders_for_vendor};
use crate::queries::vendors::require_vendor;

/// Persists the order produced by a lifecycle command and recomputes the
/// metrics of every affected vendor.
///
/// # Errors
///
/// Returns an error, with nothing written, if:
/// - The order's vendor does not exist
/// - The order number is already taken
/// - The order to update no longer exists
/// - A recomputation produces an out-of-range metric
pub fn apply_purchase_order_transition(
    conn: &mut SqliteConnection,
    handler: &LifecycleHandler,
    result: &TransitionResult,
) -> Result<PurchaseOrderWriteOutcome, PersistenceError> {
    let outcome: Result<PurchaseOrderWriteOutcome, PersistenceError> =
        conn.transaction(|conn| {
            let purchase_order_id: i64 = write_purchase_order(conn, &result.purchase_order)?;

            let recorded_at: OffsetDateTime = now_utc();
            let mut recalculations: Vec<MetricsRecalculation> =
                Vec::with_capacity(result.affected_vendor_ids.len());
            for vendor_id in &result.affected_vendor_ids {
                recalculations.push(recompute_vendor(conn, handler, *vendor_id, recorded_at)?);
            }

            let purchase_order: PurchaseOrder = get_purchase_order(conn, purchase_order_id)?
                .ok_or(PersistenceError::PurchaseOrderNotFound(purchase_order_id))?;

            Ok(PurchaseOrderWriteOutcome {
                purchase_order,
                recalculations,
            })
        });

    match &outcome {
        Ok(written) => info!(
            action = result.action.as_str(),
            purchase_order_id = written.purchase_order.purchase_order_id,
            vendors = written.recalculations.len(),
            "Persisted purchase order transition"
        ),
        Err(e) => warn!(
            action = result.action.as_str(),
            error = %e,
            "Rolled back purchase order transition"
        ),
    }
    outcome
}

/// Deletes a purchase order and recomputes its vendor's metrics.
///
/// # Errors
///
/// Returns `PersistenceError::PurchaseOrderNotFound` if the order does not
/// exist, or any recomputation error, with nothing deleted.
pub fn delete_purchase_order(
    conn: &mut SqliteConnection,
    handler: &LifecycleHandler,
    purchase_order_id: i64,
) -> Result<MetricsRecalculation, PersistenceError> {
    conn.transaction(|conn| {
        let existing: PurchaseOrder = get_purchase_order(conn, purchase_order_id)?
            .ok_or(PersistenceError::PurchaseOrderNotFound(purchase_order_id))?;

        diesel::delete(purchase_orders::table)
            .filter(purchase_orders::purchase_order_id.eq(purchase_order_id))
            .execute(conn)?;
        info!(purchase_order_id, po_number = %existing.po_number, "Deleted purchase order");

        recompute_vendor(conn, handler, existing.vendor_id(), now_utc())
    })
}

fn write_purchase_order(
    conn: &mut SqliteConnection,
    order: &PurchaseOrder,
) -> Result<i64, PersistenceError> {
    let details: &PurchaseOrderDetails = &order.details;
    let items: String = serde_json::to_string(&details.items)?;
    let order_date: String = format_timestamp(details.order_date)?;
    let delivery_date: String = format_timestamp(details.delivery_date)?;
    let acknowledgment_date: Option<String> =
        order.acknowledgment_date.map(format_timestamp).transpose()?;

    if let Some(purchase_order_id) = order.purchase_order_id {
        let rows_affected: usize = diesel::update(purchase_orders::table)
            .filter(purchase_orders::purchase_order_id.eq(purchase_order_id))
            .set((
                purchase_orders::vendor_id.eq(details.vendor_id),
                purchase_orders::order_date.eq(&order_date),
                purchase_orders::delivery_date.eq(&delivery_date),
                purchase_orders::items.eq(&items),
                purchase_orders::quantity.eq(details.quantity),
                purchase_orders::status.eq(details.status.as_str()),
                purchase_orders::quality_rating.eq(details.quality_rating),
                purchase_orders::acknowledgment_date.eq(&acknowledgment_date),
            ))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::PurchaseOrderNotFound(purchase_order_id));
        }
        debug!(purchase_order_id, "Updated purchase order row");
        return Ok(purchase_order_id);
    }

    diesel::insert_into(purchase_orders::table)
        .values((
            purchase_orders::po_number.eq(order.po_number.value()),
            purchase_orders::vendor_id.eq(details.vendor_id),
            purchase_orders::order_date.eq(&order_date),
            purchase_orders::delivery_date.eq(&delivery_date),
            purchase_orders::items.eq(&items),
            purchase_orders::quantity.eq(details.quantity),
            purchase_orders::status.eq(details.status.as_str()),
            purchase_orders::quality_rating.eq(details.quality_rating),
            purchase_orders::issue_date.eq(format_timestamp(order.issue_date)?),
            purchase_orders::acknowledgment_date.eq(&acknowledgment_date),
        ))
        .execute(conn)?;

    let purchase_order_id: i64 = last_insert_rowid(conn)?;
    debug!(purchase_order_id, "Inserted purchase order row");
    Ok(purchase_order_id)
}

fn recompute_vendor(
    conn: &mut SqliteConnection,
    handler: &LifecycleHandler,
    vendor_id: i64,
    recorded_at: OffsetDateTime,
) -> Result<MetricsRecalculation, PersistenceError> {
    let vendor: Vendor = require_vendor(conn, vendor_id)?;
    let orders: Vec<PurchaseOrder> = list_purchase_orders_for_vendor(conn, vendor_id)?;

    let recalculation: MetricsRecalculation = handler.recalculate(&vendor, &orders)?;
    update_vendor_metrics(conn, vendor_id, &recalculation.after)?;
    insert_performance_snapshot(conn, vendor_id, recorded_at, &recalculation.after)?;

    Ok(recalculation)
}
