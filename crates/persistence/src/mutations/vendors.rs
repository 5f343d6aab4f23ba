// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::{debug, info};
use vms_domain::{Vendor, VendorMetrics, VendorProfile, format_timestamp};

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{historical_performances, vendors};
use crate::error::PersistenceError;
use crate::queries::vendors::require_vendor;

/// Inserts a vendor with zero metrics.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the vendor code is taken.
pub fn create_vendor(
    conn: &mut SqliteConnection,
    profile: &VendorProfile,
) -> Result<Vendor, PersistenceError> {
    let metrics: VendorMetrics = VendorMetrics::zero();

    diesel::insert_into(vendors::table)
        .values((
            vendors::name.eq(&profile.name),
            vendors::contact_details.eq(&profile.contact_details),
            vendors::address.eq(&profile.address),
            vendors::vendor_code.eq(&profile.vendor_code),
            vendors::on_time_delivery_rate.eq(metrics.on_time_delivery_rate()),
            vendors::quality_rating_avg.eq(metrics.quality_rating_avg()),
            vendors::average_response_time.eq(metrics.average_response_time()),
            vendors::fulfillment_rate.eq(metrics.fulfillment_rate()),
        ))
        .execute(conn)?;

    let vendor_id: i64 = last_insert_rowid(conn)?;
    info!(vendor_id, vendor_code = %profile.vendor_code, "Created vendor");

    Ok(Vendor {
        vendor_id,
        profile: profile.clone(),
        metrics,
    })
}

/// Replaces a vendor's client-writable fields. Metrics are untouched.
///
/// # Errors
///
/// Returns `PersistenceError::VendorNotFound` if the vendor does not exist
/// and `PersistenceError::UniqueViolation` if the new code is taken.
pub fn update_vendor_profile(
    conn: &mut SqliteConnection,
    vendor_id: i64,
    profile: &VendorProfile,
) -> Result<Vendor, PersistenceError> {
    let rows_affected: usize = diesel::update(vendors::table)
        .filter(vendors::vendor_id.eq(vendor_id))
        .set((
            vendors::name.eq(&profile.name),
            vendors::contact_details.eq(&profile.contact_details),
            vendors::address.eq(&profile.address),
            vendors::vendor_code.eq(&profile.vendor_code),
        ))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::VendorNotFound(vendor_id));
    }

    info!(vendor_id, "Updated vendor profile");
    require_vendor(conn, vendor_id)
}

/// Deletes a vendor together with its orders and history.
///
/// # Errors
///
/// Returns `PersistenceError::VendorNotFound` if no row was removed.
pub fn delete_vendor(conn: &mut SqliteConnection, vendor_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(vendors::table)
        .filter(vendors::vendor_id.eq(vendor_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::VendorNotFound(vendor_id));
    }

    info!(vendor_id, "Deleted vendor");
    Ok(())
}

/// Stores recomputed metrics on the vendor row.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_vendor_metrics(
    conn: &mut SqliteConnection,
    vendor_id: i64,
    metrics: &VendorMetrics,
) -> Result<(), PersistenceError> {
    diesel::update(vendors::table)
        .filter(vendors::vendor_id.eq(vendor_id))
        .set((
            vendors::on_time_delivery_rate.eq(metrics.on_time_delivery_rate()),
            vendors::quality_rating_avg.eq(metrics.quality_rating_avg()),
            vendors::average_response_time.eq(metrics.average_response_time()),
            vendors::fulfillment_rate.eq(metrics.fulfillment_rate()),
        ))
        .execute(conn)?;

    debug!(vendor_id, "Stored vendor metrics");
    Ok(())
}

/// Appends a performance snapshot.
///
/// # Errors
///
/// Returns an error if the database insert fails.
pub fn insert_performance_snapshot(
    conn: &mut SqliteConnection,
    vendor_id: i64,
    recorded_at: OffsetDateTime,
    metrics: &VendorMetrics,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(historical_performances::table)
        .values((
            historical_performances::vendor_id.eq(vendor_id),
            historical_performances::recorded_at.eq(format_timestamp(recorded_at)?),
            historical_performances::on_time_delivery_rate.eq(metrics.on_time_delivery_rate()),
            historical_performances::quality_rating_avg.eq(metrics.quality_rating_avg()),
            historical_performances::average_response_time.eq(metrics.average_response_time()),
            historical_performances::fulfillment_rate.eq(metrics.fulfillment_rate()),
        ))
        .execute(conn)?;

    last_insert_rowid(conn)
}
