// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for authenticated routes.
//!
//! Every route except login takes a [`SessionUser`], so a request without
//! a valid bearer token never reaches an API handler.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use vms_api::{ApiError, AuthError, AuthenticatedActor, AuthenticationService};
use vms_domain::now_utc;

use crate::{AppState, HttpError};

/// Extractor for the authenticated user behind a request.
///
/// # Authentication Flow
///
/// 1. Extract `Authorization: Bearer <token>` header
/// 2. Validate the access token via `AuthenticationService::validate_session`
/// 3. Reject expired sessions and inactive users
///
/// # Errors
///
/// Rejects with HTTP 401 if the header is missing or malformed, or the
/// session is invalid, and with HTTP 500 if session storage fails.
pub struct SessionUser(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let actor: AuthenticatedActor =
            AuthenticationService::validate_session(&mut persistence, token.trim(), now_utc())
                .map_err(|e| {
                    warn!(error = %e, "Session validation failed");
                    SessionError::from(e)
                })?;
        drop(persistence);

        debug!(
            username = %actor.username,
            role = actor.role.as_str(),
            "Session validated"
        );

        Ok(Self(actor))
    }
}

/// Session extraction errors.
#[derive(Debug)]
pub enum SessionError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// Session validation failed.
    InvalidSession(String),
    /// Session storage could not be read.
    Storage(String),
}

impl From<AuthError> for SessionError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal { message } => Self::Storage(message),
            other => Self::InvalidSession(other.to_string()),
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => {
                String::from("Authentication credentials were not provided.")
            }
            Self::InvalidAuthorizationHeader => {
                String::from("Invalid Authorization header format. Expected: 'Bearer <token>'")
            }
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
            Self::Storage(message) => {
                return HttpError::from(ApiError::Internal { message }).into_response();
            }
        };

        HttpError::new(StatusCode::UNAUTHORIZED, message).into_response()
    }
}
