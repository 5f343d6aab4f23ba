// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `users` — User accounts and sessions
//! - `vendors` — Vendor profile writes, metric updates and history snapshots
//! - `purchase_orders` — Transactional purchase order writes with metric
//!   recomputation

pub mod purchase_orders;
pub mod users;
pub mod vendors;
