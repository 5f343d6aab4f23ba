// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tracing::{debug, info, warn};
use vms_domain::PoNumber;

use crate::error::CoreError;
use crate::state::{MetricsRecalculation, TransitionResult};

/// Receives notifications from the lifecycle handler.
///
/// Implementations must not fail; they observe and never veto.
pub trait LifecycleObserver: Send + Sync {
    /// A purchase order number was assigned to a new order.
    fn po_number_assigned(&self, po_number: &PoNumber, generated: bool);

    /// A command was applied and is ready to be persisted.
    fn transition_applied(&self, result: &TransitionResult);

    /// A command was rejected.
    fn transition_rejected(&self, command: &'static str, error: &CoreError);

    /// A vendor's metrics were recomputed.
    fn metrics_recalculated(&self, recalculation: &MetricsRecalculation);
}

/// Forwards lifecycle notifications to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl LifecycleObserver for TracingObserver {
    fn po_number_assigned(&self, po_number: &PoNumber, generated: bool) {
        debug!(po_number = %po_number, generated, "Assigned purchase order number");
    }

    fn transition_applied(&self, result: &TransitionResult) {
        info!(
            action = result.action.as_str(),
            po_number = %result.purchase_order.po_number,
            vendor_id = result.purchase_order.vendor_id(),
            status = %result.purchase_order.details.status,
            "Applied purchase order transition"
        );
    }

    fn transition_rejected(&self, command: &'static str, error: &CoreError) {
        warn!(command, error = %error, "Rejected purchase order command");
    }

    fn metrics_recalculated(&self, recalculation: &MetricsRecalculation) {
        info!(
            vendor_id = recalculation.vendor_id,
            changed = recalculation.changed(),
            on_time_delivery_rate = recalculation.after.on_time_delivery_rate(),
            quality_rating_avg = recalculation.after.quality_rating_avg(),
            average_response_time = recalculation.after.average_response_time(),
            fulfillment_rate = recalculation.after.fulfillment_rate(),
            "Recalculated vendor metrics"
        );
    }
}
