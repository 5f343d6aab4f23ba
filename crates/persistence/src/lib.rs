// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the vendor management system.
//!
//! Built on Diesel over `SQLite`. In-memory databases back the tests;
//! deployments use a file with WAL enabled. Migrations are embedded and run
//! when a connection is opened.
//!
//! Purchase order writes go through [`Persistence::apply_purchase_order_transition`],
//! which stores the order, recomputes vendor metrics and appends history
//! snapshots in a single transaction.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use vms::{LifecycleHandler, MetricsRecalculation, TransitionResult};
use vms_domain::{HistoricalPerformance, PurchaseOrder, Vendor, VendorProfile};

use crate::backend::sqlite::StorageMode;

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{PurchaseOrderWriteOutcome, SessionData, UserData};
pub use error::PersistenceError;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives its own shared-cache database, so tests are
    /// isolated from one another.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection =
            backend::sqlite::open(&shared_memory_url, StorageMode::InMemory)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let conn: SqliteConnection = backend::sqlite::open(path_str, StorageMode::File)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users & Sessions
    // ========================================================================

    /// Creates a user with a bcrypt-hashed password.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or hashing fails.
    pub fn create_user(
        &mut self,
        username: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_user(&mut self.conn, username, password, role)
    }

    /// Retrieves a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_username(
        &mut self,
        username: &str,
    ) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_username(&mut self.conn, username)
    }

    /// Retrieves a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        queries::users::get_user_by_id(&mut self.conn, user_id)
    }

    /// Counts user accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        queries::users::count_users(&mut self.conn)
    }

    /// Records a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn update_last_login(
        &mut self,
        user_id: i64,
        at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::users::update_last_login(&mut self.conn, user_id, at)
    }

    /// Activates or deactivates a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the update fails.
    pub fn set_user_active(&mut self, user_id: i64, active: bool) -> Result<(), PersistenceError> {
        mutations::users::set_user_active(&mut self.conn, user_id, active)
    }

    /// Verifies a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        queries::users::verify_password(password, password_hash)
    }

    /// Creates a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_session(
        &mut self,
        access_token: &str,
        refresh_token: &str,
        user_id: i64,
        created_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        mutations::users::create_session(
            &mut self.conn,
            access_token,
            refresh_token,
            user_id,
            created_at,
            expires_at,
        )
    }

    /// Retrieves a session by access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_access_token(
        &mut self,
        access_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_access_token(&mut self.conn, access_token)
    }

    /// Retrieves a session by refresh token.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_session_by_refresh_token(
        &mut self,
        refresh_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        queries::users::get_session_by_refresh_token(&mut self.conn, refresh_token)
    }

    /// Deletes a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist.
    pub fn delete_session(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        mutations::users::delete_session(&mut self.conn, session_id)
    }

    /// Deletes sessions that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_expired_sessions(&mut self, now: OffsetDateTime) -> Result<usize, PersistenceError> {
        mutations::users::delete_expired_sessions(&mut self.conn, now)
    }

    // ========================================================================
    // Vendors
    // ========================================================================

    /// Creates a vendor with zero metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor code is taken.
    pub fn create_vendor(&mut self, profile: &VendorProfile) -> Result<Vendor, PersistenceError> {
        mutations::vendors::create_vendor(&mut self.conn, profile)
    }

    /// Retrieves a vendor by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vendor(&mut self, vendor_id: i64) -> Result<Option<Vendor>, PersistenceError> {
        queries::vendors::get_vendor(&mut self.conn, vendor_id)
    }

    /// Retrieves a vendor by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_vendor_by_code(
        &mut self,
        vendor_code: &str,
    ) -> Result<Option<Vendor>, PersistenceError> {
        queries::vendors::get_vendor_by_code(&mut self.conn, vendor_code)
    }

    /// Lists all vendors.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_vendors(&mut self) -> Result<Vec<Vendor>, PersistenceError> {
        queries::vendors::list_vendors(&mut self.conn)
    }

    /// Replaces a vendor's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor does not exist or the code is taken.
    pub fn update_vendor_profile(
        &mut self,
        vendor_id: i64,
        profile: &VendorProfile,
    ) -> Result<Vendor, PersistenceError> {
        mutations::vendors::update_vendor_profile(&mut self.conn, vendor_id, profile)
    }

    /// Deletes a vendor and everything that references it.
    ///
    /// # Errors
    ///
    /// Returns an error if the vendor does not exist.
    pub fn delete_vendor(&mut self, vendor_id: i64) -> Result<(), PersistenceError> {
        mutations::vendors::delete_vendor(&mut self.conn, vendor_id)
    }

    // ========================================================================
    // Purchase Orders
    // ========================================================================

    /// Retrieves a purchase order by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_purchase_order(
        &mut self,
        purchase_order_id: i64,
    ) -> Result<Option<PurchaseOrder>, PersistenceError> {
        queries::purchase_orders::get_purchase_order(&mut self.conn, purchase_order_id)
    }

    /// Lists all purchase orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_purchase_orders(&mut self) -> Result<Vec<PurchaseOrder>, PersistenceError> {
        queries::purchase_orders::list_purchase_orders(&mut self.conn)
    }

    /// Lists one vendor's purchase orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_purchase_orders_for_vendor(
        &mut self,
        vendor_id: i64,
    ) -> Result<Vec<PurchaseOrder>, PersistenceError> {
        queries::purchase_orders::list_purchase_orders_for_vendor(&mut self.conn, vendor_id)
    }

    /// Stores the order produced by a lifecycle command and recomputes the
    /// metrics of every affected vendor, atomically.
    ///
    /// # Errors
    ///
    /// Returns an error, and writes nothing, if any step fails.
    pub fn apply_purchase_order_transition(
        &mut self,
        handler: &LifecycleHandler,
        result: &TransitionResult,
    ) -> Result<PurchaseOrderWriteOutcome, PersistenceError> {
        mutations::purchase_orders::apply_purchase_order_transition(&mut self.conn, handler, result)
    }

    /// Deletes a purchase order and recomputes its vendor's metrics,
    /// atomically.
    ///
    /// # Errors
    ///
    /// Returns an error, and deletes nothing, if any step fails.
    pub fn delete_purchase_order(
        &mut self,
        handler: &LifecycleHandler,
        purchase_order_id: i64,
    ) -> Result<MetricsRecalculation, PersistenceError> {
        mutations::purchase_orders::delete_purchase_order(&mut self.conn, handler, purchase_order_id)
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Lists a vendor's performance snapshots, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_performance_history(
        &mut self,
        vendor_id: i64,
    ) -> Result<Vec<HistoricalPerformance>, PersistenceError> {
        queries::history::list_performance_history(&mut self.conn, vendor_id)
    }

    /// Exposes the raw connection to tests that need to bypass the domain.
    #[cfg(test)]
    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}
