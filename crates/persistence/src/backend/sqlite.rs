// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Opening and configuring the `SQLite` store.

use diesel::dsl::sql;
use diesel::migration::MigrationVersion;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use diesel::{Connection, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::error::PersistenceError;

/// Schema for users, sessions, vendors, purchase orders and history.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a writer waits on a locked file database, in milliseconds.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Where the database lives, which decides the connection pragmas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// A shared-cache in-memory database. Journal settings do not apply.
    InMemory,
    /// A database file shared with readers through WAL.
    File,
}

impl StorageMode {
    pub(crate) fn pragmas(self) -> Vec<String> {
        let mut pragmas: Vec<String> = vec![String::from("PRAGMA foreign_keys = ON")];
        if self == Self::File {
            pragmas.push(String::from("PRAGMA journal_mode = WAL"));
            pragmas.push(String::from("PRAGMA synchronous = NORMAL"));
            pragmas.push(format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"));
        }
        pragmas
    }
}

// Diesel has no PRAGMA DSL.
#[derive(QueryableByName)]
struct ForeignKeysPragma {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}

/// Opens the database at `database_url`, applies the pragmas for `mode`,
/// brings the schema up to date and checks that cascades will fire.
///
/// # Errors
///
/// Returns an error if the connection, a pragma, a migration or the
/// foreign key check fails.
pub fn open(database_url: &str, mode: StorageMode) -> Result<SqliteConnection, PersistenceError> {
    info!(database_url, ?mode, "Opening vendor database");

    let mut conn: SqliteConnection = SqliteConnection::establish(database_url)
        .map_err(|e| PersistenceError::DatabaseConnectionFailed(e.to_string()))?;

    for pragma in mode.pragmas() {
        diesel::sql_query(pragma.as_str())
            .execute(&mut conn)
            .map_err(|e| PersistenceError::QueryFailed(format!("{pragma}: {e}")))?;
    }

    let applied: Vec<MigrationVersion<'_>> = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))?;
    if applied.is_empty() {
        debug!("Schema already up to date");
    }
    for version in &applied {
        info!(%version, "Applied migration");
    }

    verify_foreign_key_enforcement(&mut conn)?;
    Ok(conn)
}

/// Returns the rowid of the most recent insert on this connection.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn last_insert_rowid(conn: &mut SqliteConnection) -> Result<i64, PersistenceError> {
    Ok(diesel::select(sql::<BigInt>("last_insert_rowid()")).get_result(conn)?)
}

/// Fails unless foreign key enforcement is on.
///
/// Deleting a vendor relies on it to remove that vendor's purchase orders
/// and history.
///
/// # Errors
///
/// Returns `PersistenceError::ForeignKeyEnforcementNotEnabled` if it is off.
pub fn verify_foreign_key_enforcement(conn: &mut SqliteConnection) -> Result<(), PersistenceError> {
    let pragma: ForeignKeysPragma =
        diesel::sql_query("PRAGMA foreign_keys").get_result::<ForeignKeysPragma>(conn)?;
    if pragma.foreign_keys == 0 {
        return Err(PersistenceError::ForeignKeyEnforcementNotEnabled);
    }
    Ok(())
}
