// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::str::FromStr;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};
use vms_domain::{normalize_timestamp, parse_timestamp};
use vms_persistence::{Persistence, PersistenceError, SessionData, UserData};

use crate::error::AuthError;

/// User roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May read and write every resource.
    Admin,
    /// May only read.
    Viewer,
}

impl Role {
    /// Returns the stored name of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Viewer => "Viewer",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "Viewer" => Ok(Self::Viewer),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {s}"),
            }),
        }
    }
}

/// An authenticated user with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The user's database identifier.
    pub user_id: i64,
    /// The user's login name.
    pub username: String,
    /// The role assigned to this user.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: i64, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }

    fn from_user(user: &UserData) -> Result<Self, AuthError> {
        Ok(Self::new(
            user.user_id,
            user.username.clone(),
            Role::from_str(&user.role)?,
        ))
    }
}

/// Authorization service for enforcing role-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks if an actor may perform a write.
    ///
    /// Only Admin actors may create, update, delete or acknowledge.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` if the actor is a Viewer.
    pub fn authorize_write(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Viewer => {
                warn!(username = %actor.username, action, "Write refused for viewer");
                Err(AuthError::Unauthorized {
                    action: action.to_string(),
                    required_role: String::from(Role::Admin.as_str()),
                })
            }
        }
    }
}

/// Tokens issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Bearer token presented on every request.
    pub access: String,
    /// Token presented to log out.
    pub refresh: String,
    /// When both tokens stop working.
    pub expires_at: OffsetDateTime,
}

/// Authentication service for login, session validation and logout.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticationService {
    session_lifetime: Duration,
}

impl Default for AuthenticationService {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SESSION_LIFETIME)
    }
}

impl AuthenticationService {
    /// Default session lifetime.
    pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::hours(12);

    /// Creates a service issuing sessions of the given lifetime.
    #[must_use]
    pub const fn new(session_lifetime: Duration) -> Self {
        Self { session_lifetime }
    }

    /// Authenticates a user and creates a session.
    ///
    /// Expired sessions are purged first.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the credentials are
    /// wrong or the user is inactive, and `AuthError::Internal` if the
    /// session expiry is not representable or storage fails.
    pub fn login(
        &self,
        persistence: &mut Persistence,
        username: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<(SessionTokens, AuthenticatedActor), AuthError> {
        let now: OffsetDateTime = normalize_timestamp(now);
        persistence
            .delete_expired_sessions(now)
            .map_err(Self::map_persistence_error)?;

        let user: UserData = persistence
            .get_user_by_username(username)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| {
                debug!(username, "Login for unknown user");
                Self::invalid_credentials()
            })?;

        let password_valid: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_valid {
            debug!(username, "Login with wrong password");
            return Err(Self::invalid_credentials());
        }

        if !user.is_active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("User account is disabled"),
            });
        }

        let actor: AuthenticatedActor = AuthenticatedActor::from_user(&user)?;
        let expires_at: OffsetDateTime = now
            .checked_add(self.session_lifetime)
            .ok_or_else(|| AuthError::Internal {
                message: format!(
                    "Session lifetime of {} overflows the login time",
                    self.session_lifetime
                ),
            })?;
        let tokens: SessionTokens = SessionTokens {
            access: Self::generate_token(),
            refresh: Self::generate_token(),
            expires_at,
        };

        persistence
            .create_session(
                &tokens.access,
                &tokens.refresh,
                user.user_id,
                now,
                tokens.expires_at,
            )
            .map_err(Self::map_persistence_error)?;
        persistence
            .update_last_login(user.user_id, now)
            .map_err(Self::map_persistence_error)?;

        info!(username, role = actor.role.as_str(), "User logged in");
        Ok((tokens, actor))
    }

    /// Validates an access token and returns the authenticated actor.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` if the token is unknown,
    /// expired, or belongs to an inactive user, and `AuthError::Internal`
    /// if the stored session cannot be read.
    pub fn validate_session(
        persistence: &mut Persistence,
        access_token: &str,
        now: OffsetDateTime,
    ) -> Result<AuthenticatedActor, AuthError> {
        let session: SessionData = persistence
            .get_session_by_access_token(access_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_timestamp(&session.expires_at).map_err(|e| AuthError::Internal {
                message: format!("Failed to parse session expiration: {e}"),
            })?;
        if now >= expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;
        if !user.is_active {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("User account is disabled"),
            });
        }

        AuthenticatedActor::from_user(&user)
    }

    /// Blacklists a refresh token by deleting its session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is unknown or belongs
    /// to a different user.
    pub fn logout(
        persistence: &mut Persistence,
        actor: &AuthenticatedActor,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let session: SessionData = persistence
            .get_session_by_refresh_token(refresh_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::InvalidToken {
                reason: String::from("Token is invalid or expired"),
            })?;

        if session.user_id != actor.user_id {
            return Err(AuthError::InvalidToken {
                reason: String::from("Token does not belong to the current user"),
            });
        }

        persistence
            .delete_session(session.session_id)
            .map_err(Self::map_persistence_error)?;

        info!(username = %actor.username, "User logged out");
        Ok(())
    }

    /// Generates an opaque 128-bit token.
    fn generate_token() -> String {
        format!("{:016x}{:016x}", rand::random::<u64>(), rand::random::<u64>())
    }

    fn invalid_credentials() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("No active account found with the given credentials"),
        }
    }

    /// Maps persistence errors to authentication errors.
    ///
    /// Only a missing session is the caller's fault; every other failure
    /// is internal.
    pub(crate) fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::SessionNotFound(_) => AuthError::InvalidToken {
                reason: String::from("Token is invalid or expired"),
            },
            other => AuthError::Internal {
                message: other.to_string(),
            },
        }
    }
}
