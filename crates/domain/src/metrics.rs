// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Vendor performance metrics.
//!
//! Every function here is pure and evaluates the purchase orders it is
//! handed at call time. Callers pass the complete order set of a single
//! vendor. A function whose denominator would be zero returns `0.0`.
//!
//! Percentages and averages are rounded to two decimal places.

use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::error::DomainError;
use crate::types::PurchaseOrder;

/// Default grace period, in days, for on-time delivery.
pub const DEFAULT_ON_TIME_GRACE_DAYS: u32 = 7;

/// Policy knobs for metric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricPolicy {
    on_time_grace_period: Duration,
}

impl MetricPolicy {
    /// Creates a policy with the given on-time grace period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NegativeGracePeriod` if the period is negative.
    pub fn new(on_time_grace_period: Duration) -> Result<Self, DomainError> {
        if on_time_grace_period.is_negative() {
            return Err(DomainError::NegativeGracePeriod(on_time_grace_period));
        }
        Ok(Self {
            on_time_grace_period,
        })
    }

    /// Creates a policy with a grace period of `days` whole days.
    #[must_use]
    pub fn with_grace_days(days: u32) -> Self {
        Self {
            on_time_grace_period: Duration::days(i64::from(days)),
        }
    }

    /// How long after issue a delivery still counts as on time.
    #[must_use]
    pub const fn on_time_grace_period(&self) -> Duration {
        self.on_time_grace_period
    }
}

impl Default for MetricPolicy {
    fn default() -> Self {
        Self::with_grace_days(DEFAULT_ON_TIME_GRACE_DAYS)
    }
}

/// The four derived vendor metrics.
///
/// Construction through [`VendorMetrics::new`] enforces the declared range
/// of every field.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VendorMetrics {
    on_time_delivery_rate: f64,
    quality_rating_avg: f64,
    average_response_time: f64,
    fulfillment_rate: f64,
}

impl VendorMetrics {
    /// Bounds for percentage metrics.
    pub const RATE_BOUNDS: (f64, f64) = (0.0, 100.0);
    /// Bounds for the quality rating average.
    pub const QUALITY_BOUNDS: (f64, f64) = (0.0, 5.0);
    /// Bounds for the average response time, in days.
    pub const RESPONSE_TIME_BOUNDS: (f64, f64) = (0.0, f64::MAX);

    /// Creates a range-checked set of metrics.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MetricOutOfRange` for the first value outside
    /// its bounds (NaN is always out of range).
    pub fn new(
        on_time_delivery_rate: f64,
        quality_rating_avg: f64,
        average_response_time: f64,
        fulfillment_rate: f64,
    ) -> Result<Self, DomainError> {
        check_bounds(
            "on_time_delivery_rate",
            on_time_delivery_rate,
            Self::RATE_BOUNDS,
        )?;
        check_bounds(
            "quality_rating_avg",
            quality_rating_avg,
            Self::QUALITY_BOUNDS,
        )?;
        check_bounds(
            "average_response_time",
            average_response_time,
            Self::RESPONSE_TIME_BOUNDS,
        )?;
        check_bounds("fulfillment_rate", fulfillment_rate, Self::RATE_BOUNDS)?;

        Ok(Self {
            on_time_delivery_rate,
            quality_rating_avg,
            average_response_time,
            fulfillment_rate,
        })
    }

    /// Metrics of a vendor with no purchase orders.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            on_time_delivery_rate: 0.0,
            quality_rating_avg: 0.0,
            average_response_time: 0.0,
            fulfillment_rate: 0.0,
        }
    }

    /// Percentage of completed orders delivered within the grace period.
    #[must_use]
    pub const fn on_time_delivery_rate(&self) -> f64 {
        self.on_time_delivery_rate
    }

    /// Mean quality rating of rated completed orders.
    #[must_use]
    pub const fn quality_rating_avg(&self) -> f64 {
        self.quality_rating_avg
    }

    /// Mean acknowledgment delay in whole days.
    #[must_use]
    pub const fn average_response_time(&self) -> f64 {
        self.average_response_time
    }

    /// Percentage of all orders that are completed.
    #[must_use]
    pub const fn fulfillment_rate(&self) -> f64 {
        self.fulfillment_rate
    }
}

fn check_bounds(
    metric: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), DomainError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::MetricOutOfRange {
            metric,
            value,
            min,
            max,
        })
    }
}

/// Rounds to two decimal places.
#[must_use]
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percentage(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    match (numerator.to_f64(), denominator.to_f64()) {
        (Some(n), Some(d)) => round_hundredths(n / d * 100.0),
        _ => 0.0,
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count
        .to_f64()
        .map_or(0.0, |count| round_hundredths(sum / count))
}

fn completed(orders: &[PurchaseOrder]) -> impl Iterator<Item = &PurchaseOrder> {
    orders.iter().filter(|order| order.is_completed())
}

fn delivered_on_time(order: &PurchaseOrder, grace: Duration) -> bool {
    // A deadline past the representable range can never be missed.
    order
        .issue_date
        .checked_add(grace)
        .is_none_or(|deadline: OffsetDateTime| order.details.delivery_date <= deadline)
}

/// Percentage of completed orders delivered no later than
/// `issue_date + grace period`.
#[must_use]
pub fn on_time_delivery_rate(orders: &[PurchaseOrder], policy: &MetricPolicy) -> f64 {
    let grace: Duration = policy.on_time_grace_period();
    let (total, on_time): (usize, usize) =
        completed(orders).fold((0, 0), |(total, on_time), order| {
            (total + 1, on_time + usize::from(delivered_on_time(order, grace)))
        });
    percentage(on_time, total)
}

/// Mean `quality_rating` over completed orders that carry a rating.
#[must_use]
pub fn quality_rating_average(orders: &[PurchaseOrder]) -> f64 {
    let ratings: Vec<f64> = completed(orders)
        .filter_map(|order| order.details.quality_rating)
        .collect();
    mean(ratings.iter().sum(), ratings.len())
}

/// Mean of `acknowledgment_date - issue_date`, in whole days, over
/// completed orders that have been acknowledged.
#[must_use]
pub fn average_response_time(orders: &[PurchaseOrder]) -> f64 {
    let days: Vec<i64> = completed(orders)
        .filter_map(|order| {
            order
                .acknowledgment_date
                .map(|acknowledged| (acknowledged - order.issue_date).whole_days())
        })
        .collect();
    let total: f64 = days.iter().filter_map(ToPrimitive::to_f64).sum();
    mean(total, days.len())
}

/// Percentage of all orders, of any status, that are completed.
#[must_use]
pub fn fulfillment_rate(orders: &[PurchaseOrder]) -> f64 {
    percentage(completed(orders).count(), orders.len())
}

/// Computes all four metrics for one vendor's orders.
///
/// # Errors
///
/// Returns `DomainError::MetricOutOfRange` if a stored order produced a value
/// outside its declared range (e.g. a corrupt quality rating).
pub fn compute_vendor_metrics(
    orders: &[PurchaseOrder],
    policy: &MetricPolicy,
) -> Result<VendorMetrics, DomainError> {
    VendorMetrics::new(
        on_time_delivery_rate(orders, policy),
        quality_rating_average(orders),
        average_response_time(orders),
        fulfillment_rate(orders),
    )
}
