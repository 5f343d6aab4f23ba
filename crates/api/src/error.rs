// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use thiserror::Error;
use vms::CoreError;
use vms_domain::{DomainError, FieldErrors};
use vms_persistence::PersistenceError;

/// Field key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A refresh token was unknown or belonged to someone else.
    #[error("Invalid token: {reason}")]
    InvalidToken {
        /// Why the token was refused.
        reason: String,
    },
    /// Session storage failed.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the failure.
        message: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// One or more request fields were rejected.
    #[error("Invalid input: {fields}")]
    Validation {
        /// Messages keyed by field.
        fields: FieldErrors,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A refresh token could not be blacklisted.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// A human-readable description of the problem.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Builds a validation error for a single field.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: FieldErrors::single(field, message),
        }
    }

    /// Builds a not-found error.
    #[must_use]
    pub fn not_found(resource_type: &str, id: i64) -> Self {
        Self::ResourceNotFound {
            resource_type: resource_type.to_string(),
            message: format!("No {resource_type} with id {id}"),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::InvalidToken { reason } => Self::InvalidToken { message: reason },
            AuthError::Internal { message } => Self::Internal { message },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::Validation(fields) => ApiError::Validation { fields },
        DomainError::InvalidStatus(_) | DomainError::InvalidStatusTransition { .. } => {
            ApiError::invalid_field("status", err.to_string())
        }
        DomainError::InvalidPoNumber(msg) => ApiError::invalid_field("po_number", msg),
        DomainError::TimestampParse { .. } => {
            ApiError::invalid_field(NON_FIELD_ERRORS, err.to_string())
        }
        DomainError::TimestampFormat(_)
        | DomainError::NegativeGracePeriod(_)
        | DomainError::MetricOutOfRange { .. } => {
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::Internal(message) => ApiError::Internal { message },
    }
}

/// Translates a persistence error into an API error.
///
/// Constraint violations that a handler can attribute to a specific field
/// are mapped by the handler before reaching this function.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::VendorNotFound(id) => ApiError::not_found("Vendor", id),
        PersistenceError::PurchaseOrderNotFound(id) => ApiError::not_found("PurchaseOrder", id),
        PersistenceError::UniqueViolation(msg) => ApiError::invalid_field(NON_FIELD_ERRORS, msg),
        PersistenceError::Core(core_err) => ApiError::Internal {
            message: format!("Metric recomputation failed: {core_err}"),
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
