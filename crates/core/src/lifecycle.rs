// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;
use time::OffsetDateTime;
use vms_domain::{
    MetricPolicy, PoNumber, PurchaseOrder, PurchaseOrderDetails, Vendor, VendorMetrics,
    compute_vendor_metrics, normalize_timestamp, validate_purchase_order_details,
    validate_status_transition,
};

use crate::command::Command;
use crate::error::CoreError;
use crate::observer::{LifecycleObserver, TracingObserver};
use crate::state::{MetricsRecalculation, TransitionAction, TransitionResult};

/// Applies purchase order commands and recomputes vendor metrics.
///
/// The handler never touches storage. It turns a command and the current
/// order into the order that must be written, and turns a vendor's stored
/// order set into fresh metrics. Persistence sequences the two inside one
/// transaction.
#[derive(Clone)]
pub struct LifecycleHandler {
    policy: MetricPolicy,
    observer: Arc<dyn LifecycleObserver>,
}

impl std::fmt::Debug for LifecycleHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHandler")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl LifecycleHandler {
    /// Creates a handler with an explicit observer.
    #[must_use]
    pub fn new(policy: MetricPolicy, observer: Arc<dyn LifecycleObserver>) -> Self {
        Self { policy, observer }
    }

    /// Creates a handler that reports through `tracing`.
    #[must_use]
    pub fn with_tracing(policy: MetricPolicy) -> Self {
        Self::new(policy, Arc::new(TracingObserver))
    }

    /// Applies a command to the current order.
    ///
    /// `current` must be `None` for a create and the stored order for every
    /// other command. `now` becomes the issue date of a new order or the
    /// acknowledgment date.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` if the new field values or the
    /// status change break a domain rule, and `CoreError::Internal` if
    /// `current` does not match the command.
    pub fn apply(
        &self,
        current: Option<&PurchaseOrder>,
        command: Command,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, CoreError> {
        let name: &'static str = command.name();
        let now: OffsetDateTime = normalize_timestamp(now);

        let result: Result<TransitionResult, CoreError> = match (current, command) {
            (None, Command::CreatePurchaseOrder { po_number, details }) => {
                self.create(po_number, details, now)
            }
            (Some(current), Command::UpdatePurchaseOrder { details }) => {
                Self::update(current, details)
            }
            (Some(current), Command::AcknowledgePurchaseOrder) => {
                Ok(Self::acknowledge(current, now))
            }
            (Some(current), Command::CreatePurchaseOrder { .. }) => Err(CoreError::Internal(
                format!("Purchase order {} already exists", current.po_number),
            )),
            (None, _) => Err(CoreError::Internal(format!(
                "{name} requires an existing purchase order"
            ))),
        };

        match &result {
            Ok(applied) => self.observer.transition_applied(applied),
            Err(e) => self.observer.transition_rejected(name, e),
        }
        result
    }

    fn create(
        &self,
        po_number: Option<PoNumber>,
        details: PurchaseOrderDetails,
        now: OffsetDateTime,
    ) -> Result<TransitionResult, CoreError> {
        validate_purchase_order_details(&details)?;

        let generated: bool = po_number.is_none();
        let po_number: PoNumber =
            po_number.unwrap_or_else(|| PoNumber::generate(now.date(), rand::random::<u64>()));
        self.observer.po_number_assigned(&po_number, generated);

        let vendor_id: i64 = details.vendor_id;
        Ok(TransitionResult {
            action: TransitionAction::Create,
            purchase_order: PurchaseOrder {
                purchase_order_id: None,
                po_number,
                details,
                issue_date: now,
                acknowledgment_date: None,
            },
            affected_vendor_ids: vec![vendor_id],
        })
    }

    fn update(
        current: &PurchaseOrder,
        details: PurchaseOrderDetails,
    ) -> Result<TransitionResult, CoreError> {
        validate_purchase_order_details(&details)?;
        validate_status_transition(current.details.status, details.status)?;

        let mut affected_vendor_ids: Vec<i64> = vec![details.vendor_id];
        if current.vendor_id() != details.vendor_id {
            affected_vendor_ids.push(current.vendor_id());
        }

        Ok(TransitionResult {
            action: TransitionAction::Update,
            purchase_order: PurchaseOrder {
                details,
                ..current.clone()
            },
            affected_vendor_ids,
        })
    }

    fn acknowledge(current: &PurchaseOrder, now: OffsetDateTime) -> TransitionResult {
        TransitionResult {
            action: TransitionAction::Acknowledge,
            purchase_order: PurchaseOrder {
                acknowledgment_date: Some(now),
                ..current.clone()
            },
            affected_vendor_ids: vec![current.vendor_id()],
        }
    }

    /// Recomputes a vendor's metrics from its complete order set.
    ///
    /// Orders belonging to other vendors are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DomainViolation` if a computed metric is out of
    /// range, which only happens when stored orders are corrupt.
    pub fn recalculate(
        &self,
        vendor: &Vendor,
        orders: &[PurchaseOrder],
    ) -> Result<MetricsRecalculation, CoreError> {
        let owned: Vec<PurchaseOrder> = orders
            .iter()
            .filter(|order| order.vendor_id() == vendor.vendor_id)
            .cloned()
            .collect();
        let after: VendorMetrics = compute_vendor_metrics(&owned, &self.policy)?;

        let recalculation: MetricsRecalculation = MetricsRecalculation {
            vendor_id: vendor.vendor_id,
            before: vendor.metrics,
            after,
        };
        self.observer.metrics_recalculated(&recalculation);
        Ok(recalculation)
    }
}
