// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vms_domain::{PurchaseOrder, VendorMetrics};

/// What a successfully applied command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    /// A new order was built.
    Create,
    /// An existing order's fields were replaced.
    Update,
    /// An existing order was acknowledged.
    Acknowledge,
}

impl TransitionAction {
    /// Returns the action name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Acknowledge => "acknowledge",
        }
    }
}

/// The result of applying a command to a purchase order.
///
/// Nothing has been persisted yet. The caller writes `purchase_order`
/// and then recomputes metrics for every vendor in `affected_vendor_ids`
/// in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The applied action.
    pub action: TransitionAction,
    /// The order as it must be stored.
    pub purchase_order: PurchaseOrder,
    /// Vendors whose metrics are stale after this write, owning vendor first.
    pub affected_vendor_ids: Vec<i64>,
}

/// Metrics of one vendor before and after a recomputation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsRecalculation {
    /// The recomputed vendor.
    pub vendor_id: i64,
    /// Metrics as previously stored.
    pub before: VendorMetrics,
    /// Freshly computed metrics.
    pub after: VendorMetrics,
}

impl MetricsRecalculation {
    /// Returns whether any metric changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}
