// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vms_domain::HistoricalPerformance;

use crate::data_models::HistoricalPerformanceRow;
use crate::diesel_schema::historical_performances;
use crate::error::PersistenceError;

/// Lists a vendor's performance snapshots, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn list_performance_history(
    conn: &mut SqliteConnection,
    vendor_id: i64,
) -> Result<Vec<HistoricalPerformance>, PersistenceError> {
    historical_performances::table
        .filter(historical_performances::vendor_id.eq(vendor_id))
        .order(historical_performances::history_id.asc())
        .select(HistoricalPerformanceRow::as_select())
        .load::<HistoricalPerformanceRow>(conn)?
        .into_iter()
        .map(HistoricalPerformance::try_from)
        .collect()
}
