// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Timestamp normalization, parsing and formatting.
//!
//! All timestamps handled by the system are UTC with whole-second
//! precision. Normalizing on the way in keeps the stored RFC 3339 text
//! lexicographically ordered, which the session expiry purge relies on.

use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::error::DomainError;

/// Converts a timestamp to UTC and drops sub-second precision.
#[must_use]
pub fn normalize_timestamp(value: OffsetDateTime) -> OffsetDateTime {
    let utc: OffsetDateTime = value.to_offset(UtcOffset::UTC);
    utc - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

/// Returns the current time, normalized.
#[must_use]
pub fn now_utc() -> OffsetDateTime {
    normalize_timestamp(OffsetDateTime::now_utc())
}

/// Parses an RFC 3339 date-time or a bare `YYYY-MM-DD` date.
///
/// Bare dates are interpreted as midnight UTC.
///
/// # Errors
///
/// Returns `DomainError::TimestampParse` if the value matches neither form.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    let trimmed: &str = value.trim();

    if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Ok(normalize_timestamp(parsed));
    }

    let date: Date = Date::parse(trimmed, format_description!("[year]-[month]-[day]")).map_err(
        |e| DomainError::TimestampParse {
            value: value.to_string(),
            error: e.to_string(),
        },
    )?;

    Ok(date.midnight().assume_utc())
}

/// Formats a timestamp as RFC 3339 in UTC.
///
/// # Errors
///
/// Returns `DomainError::TimestampFormat` if the year cannot be represented.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, DomainError> {
    normalize_timestamp(value)
        .format(&Rfc3339)
        .map_err(|e| DomainError::TimestampFormat(e.to_string()))
}
