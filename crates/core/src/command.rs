// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vms_domain::{PoNumber, PurchaseOrderDetails};

/// A command represents user intent against a purchase order as data only.
///
/// Commands are the only way to request purchase order state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a new purchase order.
    CreatePurchaseOrder {
        /// A caller-supplied number. One is generated when absent.
        po_number: Option<PoNumber>,
        /// The client-writable fields.
        details: PurchaseOrderDetails,
    },
    /// Replace the client-writable fields of an existing order.
    UpdatePurchaseOrder {
        /// The new field values.
        details: PurchaseOrderDetails,
    },
    /// Record that the vendor acknowledged the order.
    AcknowledgePurchaseOrder,
}

impl Command {
    /// Returns the command name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreatePurchaseOrder { .. } => "CreatePurchaseOrder",
            Self::UpdatePurchaseOrder { .. } => "UpdatePurchaseOrder",
            Self::AcknowledgePurchaseOrder => "AcknowledgePurchaseOrder",
        }
    }
}
