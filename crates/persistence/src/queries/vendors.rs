// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vms_domain::Vendor;

use crate::data_models::VendorRow;
use crate::diesel_schema::vendors;
use crate::error::PersistenceError;

/// Retrieves a vendor by ID.
///
/// # Errors
///
/// Returns an error if the query fails or the stored metrics are out of
/// range. Returns `Ok(None)` if the vendor does not exist.
pub fn get_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i64,
) -> Result<Option<Vendor>, PersistenceError> {
    vendors::table
        .filter(vendors::vendor_id.eq(vendor_id))
        .select(VendorRow::as_select())
        .first::<VendorRow>(conn)
        .optional()?
        .map(Vendor::try_from)
        .transpose()
}

/// Retrieves a vendor by its unique code.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_vendor_by_code(
    conn: &mut SqliteConnection,
    vendor_code: &str,
) -> Result<Option<Vendor>, PersistenceError> {
    vendors::table
        .filter(vendors::vendor_code.eq(vendor_code))
        .select(VendorRow::as_select())
        .first::<VendorRow>(conn)
        .optional()?
        .map(Vendor::try_from)
        .transpose()
}

/// Lists all vendors ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vendors(conn: &mut SqliteConnection) -> Result<Vec<Vendor>, PersistenceError> {
    vendors::table
        .order(vendors::vendor_id.asc())
        .select(VendorRow::as_select())
        .load::<VendorRow>(conn)?
        .into_iter()
        .map(Vendor::try_from)
        .collect()
}

/// Loads a vendor that must exist.
///
/// # Errors
///
/// Returns `PersistenceError::VendorNotFound` if it does not.
pub fn require_vendor(
    conn: &mut SqliteConnection,
    vendor_id: i64,
) -> Result<Vendor, PersistenceError> {
    get_vendor(conn, vendor_id)?.ok_or(PersistenceError::VendorNotFound(vendor_id))
}
