// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User and session mutations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use tracing::{debug, info};
use vms_domain::{format_timestamp, now_utc};

use crate::backend::sqlite::last_insert_rowid;
use crate::diesel_schema::{sessions, users};
use crate::error::PersistenceError;

/// Creates a new user.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `username` - The login name, matched exactly
/// * `password` - The plain-text password (will be hashed)
/// * `role` - The role (`Admin` or `Viewer`)
///
/// # Errors
///
/// Returns an error if the password cannot be hashed or the username
/// already exists.
pub fn create_user(
    conn: &mut SqliteConnection,
    username: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    info!(username, role, "Creating user");

    let password_hash: String = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;
    let created_at: String = format_timestamp(now_utc())?;

    diesel::insert_into(users::table)
        .values((
            users::username.eq(username),
            users::password_hash.eq(&password_hash),
            users::role.eq(role),
            users::is_active.eq(1),
            users::created_at.eq(&created_at),
        ))
        .execute(conn)?;

    let user_id: i64 = last_insert_rowid(conn)?;
    info!(user_id, "User created");
    Ok(user_id)
}

/// Records a successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(
    conn: &mut SqliteConnection,
    user_id: i64,
    at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::last_login_at.eq(Some(format_timestamp(at)?)))
        .execute(conn)?;

    Ok(())
}

/// Marks a user active or inactive. Inactive users cannot log in.
///
/// # Errors
///
/// Returns an error if the database update fails or the user does not exist.
pub fn set_user_active(
    conn: &mut SqliteConnection,
    user_id: i64,
    active: bool,
) -> Result<(), PersistenceError> {
    info!(user_id, active, "Updating user active flag");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::is_active.eq(i32::from(active)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::NotFound(format!(
            "User with ID {user_id} not found"
        )));
    }
    Ok(())
}

/// Creates a session.
///
/// # Errors
///
/// Returns an error if either token collides with an existing session or
/// the user does not exist.
pub fn create_session(
    conn: &mut SqliteConnection,
    access_token: &str,
    refresh_token: &str,
    user_id: i64,
    created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
) -> Result<i64, PersistenceError> {
    debug!(user_id, "Creating session");

    diesel::insert_into(sessions::table)
        .values((
            sessions::access_token.eq(access_token),
            sessions::refresh_token.eq(refresh_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(format_timestamp(created_at)?),
            sessions::expires_at.eq(format_timestamp(expires_at)?),
        ))
        .execute(conn)?;

    last_insert_rowid(conn)
}

/// Deletes a session.
///
/// # Errors
///
/// Returns `PersistenceError::SessionNotFound` if no row was removed.
pub fn delete_session(conn: &mut SqliteConnection, session_id: i64) -> Result<(), PersistenceError> {
    let rows_affected: usize = diesel::delete(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::SessionNotFound(session_id));
    }

    debug!(session_id, "Deleted session");
    Ok(())
}

/// Deletes every session that expired before `now`.
///
/// Timestamps are stored as normalized UTC RFC 3339 text, so string
/// comparison orders them correctly.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<usize, PersistenceError> {
    let cutoff: String = format_timestamp(now)?;
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(cutoff))
        .execute(conn)?;

    if deleted > 0 {
        info!(deleted, "Purged expired sessions");
    }
    Ok(deleted)
}
