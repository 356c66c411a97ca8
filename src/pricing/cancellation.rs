//! Time-windowed cancellation refunds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;
use super::money::Money;

/// Refund windows measured in whole hours before the booking starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationWindow {
    pub free_cancellation_hours: i64,
    pub partial_refund_hours: i64,
    /// Percentage (0..=100) refunded inside the partial window.
    pub refund_percentage: Decimal,
}

impl Default for CancellationWindow {
    fn default() -> Self {
        Self {
            free_cancellation_hours: 24,
            partial_refund_hours: 12,
            refund_percentage: Decimal::from(50),
        }
    }
}

impl CancellationWindow {
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.partial_refund_hours < 0 {
            return Err(PricingError::window(format!(
                "partial_refund_hours must not be negative, got {}",
                self.partial_refund_hours
            )));
        }
        if self.free_cancellation_hours < self.partial_refund_hours {
            return Err(PricingError::window(format!(
                "free_cancellation_hours ({}) is below partial_refund_hours ({})",
                self.free_cancellation_hours, self.partial_refund_hours
            )));
        }
        if self.refund_percentage < Decimal::ZERO || self.refund_percentage > Decimal::ONE_HUNDRED {
            return Err(PricingError::window(format!(
                "refund_percentage {} is outside [0, 100]",
                self.refund_percentage
            )));
        }
        Ok(())
    }

    /// Share of the price refunded in the partial window, as a fraction.
    pub(crate) fn refund_fraction(&self) -> Decimal {
        self.refund_percentage / Decimal::ONE_HUNDRED
    }
}

/// Why a refund was (or was not) granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundReason {
    Full,
    Partial,
    None,
}

/// Refund decision for one cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationOutcome {
    pub refund: Money,
    pub reason: RefundReason,
    pub hours_until_start: i64,
}

/// Whole hours between request and start, truncated toward zero.
pub fn hours_until_start(booking_start: DateTime<Utc>, request_time: DateTime<Utc>) -> i64 {
    (booking_start - request_time).num_hours()
}

/// Decide the refund for cancelling a booking of `final_price`.
///
/// A request made after the booking has started is not an error; it simply
/// earns no refund.
pub fn evaluate_cancellation(
    booking_start: DateTime<Utc>,
    request_time: DateTime<Utc>,
    window: &CancellationWindow,
    final_price: &Money,
) -> Result<CancellationOutcome, PricingError> {
    window.validate()?;

    let hours = hours_until_start(booking_start, request_time);

    let (reason, refund) = if request_time > booking_start {
        (RefundReason::None, final_price.zeroed())
    } else if hours >= window.free_cancellation_hours {
        (RefundReason::Full, final_price.clone())
    } else if hours >= window.partial_refund_hours {
        (RefundReason::Partial, final_price.scale(window.refund_fraction())?)
    } else {
        (RefundReason::None, final_price.zeroed())
    };

    Ok(CancellationOutcome {
        refund,
        reason,
        hours_until_start: hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn usd(amount: i64) -> Money {
        Money::new(amount, "USD").unwrap()
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap()
    }

    fn cancel_at(hours_before: i64) -> CancellationOutcome {
        let request = start() - Duration::hours(hours_before);
        evaluate_cancellation(start(), request, &CancellationWindow::default(), &usd(18000)).unwrap()
    }

    #[test]
    fn test_full_refund_outside_free_window() {
        let outcome = cancel_at(30);
        assert_eq!(outcome.reason, RefundReason::Full);
        assert_eq!(outcome.refund, usd(18000));
        assert_eq!(outcome.hours_until_start, 30);
    }

    #[test]
    fn test_partial_refund_inside_partial_window() {
        let outcome = cancel_at(15);
        assert_eq!(outcome.reason, RefundReason::Partial);
        assert_eq!(outcome.refund, usd(9000));
    }

    #[test]
    fn test_no_refund_close_to_start() {
        let outcome = cancel_at(2);
        assert_eq!(outcome.reason, RefundReason::None);
        assert_eq!(outcome.refund, usd(0));
        assert_eq!(outcome.refund.currency(), "USD");
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        assert_eq!(cancel_at(24).reason, RefundReason::Full);
        assert_eq!(cancel_at(23).reason, RefundReason::Partial);
        assert_eq!(cancel_at(12).reason, RefundReason::Partial);
        assert_eq!(cancel_at(11).reason, RefundReason::None);
    }

    #[test]
    fn test_hours_truncate_toward_zero() {
        // 23h59m before start counts as 23 hours: partial, not full.
        let request = start() - Duration::hours(23) - Duration::minutes(59);
        assert_eq!(hours_until_start(start(), request), 23);
        let outcome =
            evaluate_cancellation(start(), request, &CancellationWindow::default(), &usd(18000))
                .unwrap();
        assert_eq!(outcome.reason, RefundReason::Partial);
    }

    #[test]
    fn test_request_after_start_gets_no_refund() {
        let window = CancellationWindow {
            free_cancellation_hours: 0,
            partial_refund_hours: 0,
            refund_percentage: dec!(100),
        };
        // 30 minutes late truncates to 0 hours but still earns nothing.
        let request = start() + Duration::minutes(30);
        let outcome = evaluate_cancellation(start(), request, &window, &usd(18000)).unwrap();
        assert_eq!(outcome.reason, RefundReason::None);
        assert!(outcome.refund.is_zero());

        let outcome = cancel_at(-5);
        assert_eq!(outcome.reason, RefundReason::None);
        assert_eq!(outcome.hours_until_start, -5);
    }

    #[test]
    fn test_refund_monotonic_as_start_approaches() {
        let mut previous = i64::MAX;
        for hours_before in (-48..=72).rev() {
            let refund = cancel_at(hours_before).refund.amount();
            assert!(refund <= previous, "hours_before {}", hours_before);
            previous = refund;
        }
    }

    #[test]
    fn test_partial_refund_rounds_to_minor_unit() {
        let window = CancellationWindow {
            free_cancellation_hours: 48,
            partial_refund_hours: 0,
            refund_percentage: dec!(33.3),
        };
        let outcome = evaluate_cancellation(start(), start(), &window, &usd(1001)).unwrap();
        // 1001 * 0.333 = 333.333 -> 333
        assert_eq!(outcome.refund, usd(333));
    }

    #[test]
    fn test_invalid_windows() {
        let inverted = CancellationWindow {
            free_cancellation_hours: 12,
            partial_refund_hours: 24,
            refund_percentage: dec!(50),
        };
        let err = evaluate_cancellation(start(), start(), &inverted, &usd(100)).unwrap_err();
        assert_eq!(err.kind(), "invalid_window");

        let negative = CancellationWindow {
            free_cancellation_hours: 24,
            partial_refund_hours: -1,
            refund_percentage: dec!(50),
        };
        assert!(negative.validate().is_err());

        let over = CancellationWindow {
            refund_percentage: dec!(100.5),
            ..CancellationWindow::default()
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_refund_reason_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&RefundReason::Full).unwrap(), "\"FULL\"");
        assert_eq!(serde_json::to_string(&RefundReason::Partial).unwrap(), "\"PARTIAL\"");
        assert_eq!(serde_json::to_string(&RefundReason::None).unwrap(), "\"NONE\"");
    }
}
