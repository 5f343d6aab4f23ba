// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vms_domain::PurchaseOrder;

use crate::data_models::PurchaseOrderRow;
use crate::diesel_schema::purchase_orders;
use crate::error::PersistenceError;

/// Retrieves a purchase order by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be decoded.
/// Returns `Ok(None)` if the order does not exist.
pub fn get_purchase_order(
    conn: &mut SqliteConnection,
    purchase_order_id: i64,
) -> Result<Option<PurchaseOrder>, PersistenceError> {
    purchase_orders::table
        .filter(purchase_orders::purchase_order_id.eq(purchase_order_id))
        .select(PurchaseOrderRow::as_select())
        .first::<PurchaseOrderRow>(conn)
        .optional()?
        .map(PurchaseOrder::try_from)
        .transpose()
}

/// Lists all purchase orders ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_purchase_orders(
    conn: &mut SqliteConnection,
) -> Result<Vec<PurchaseOrder>, PersistenceError> {
    purchase_orders::table
        .order(purchase_orders::purchase_order_id.asc())
        .select(PurchaseOrderRow::as_select())
        .load::<PurchaseOrderRow>(conn)?
        .into_iter()
        .map(PurchaseOrder::try_from)
        .collect()
}

/// Lists one vendor's purchase orders ordered by ID.
///
/// This is the complete order set metrics are computed from.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_purchase_orders_for_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i64,
) -> Result<Vec<PurchaseOrder>, PersistenceError> {
    purchase_orders::table
        .filter(purchase_orders::vendor_id.eq(vendor_id))
        .order(purchase_orders::purchase_order_id.asc())
        .select(PurchaseOrderRow::as_select())
        .load::<PurchaseOrderRow>(conn)?
        .into_iter()
        .map(PurchaseOrder::try_from)
        .collect()
}
