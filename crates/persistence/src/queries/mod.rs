// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `users` — User accounts, sessions and password verification
//! - `vendors` — Vendor lookups
//! - `purchase_orders` — Purchase order lookups
//! - `history` — Performance snapshots

pub mod history;
pub mod purchase_orders;
pub mod users;
pub mod vendors;
