// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use time::Duration;

/// Per-field validation messages.
///
/// Keys are the wire names of the offending fields. A field may carry
/// more than one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty error map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Creates an error map holding a single message.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors: Self = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Merges another map into this one.
    pub fn merge(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Returns `true` if no field has a message.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the given field has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns the messages recorded against a field.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.0
    }

    /// Converts the map into a result, failing when any message was recorded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the map is not empty.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first: bool = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// One or more fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),
    /// A purchase order status string is not recognised.
    #[error("Invalid purchase order status: {0}")]
    InvalidStatus(String),
    /// A purchase order may not move from one status to another.
    #[error("Purchase order status cannot change from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: &'static str,
        /// The requested status.
        to: &'static str,
    },
    /// A purchase order number is empty or too long.
    #[error("Invalid purchase order number: {0}")]
    InvalidPoNumber(String),
    /// A timestamp could not be parsed.
    #[error("Failed to parse timestamp '{value}': {error}")]
    TimestampParse {
        /// The rejected input.
        value: String,
        /// The parser's explanation.
        error: String,
    },
    /// A timestamp could not be rendered.
    #[error("Failed to format timestamp: {0}")]
    TimestampFormat(String),
    /// An on-time grace period was negative.
    #[error("On-time grace period must not be negative: {0}")]
    NegativeGracePeriod(Duration),
    /// A computed metric fell outside its declared range.
    #[error("Metric {metric} = {value} is outside [{min}, {max}]")]
    MetricOutOfRange {
        /// The metric name.
        metric: &'static str,
        /// The offending value.
        value: f64,
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },
}

impl DomainError {
    /// Returns the field map when this is a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
