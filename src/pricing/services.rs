//! Settlement: price, commission split and optional cancellation in one step.
//!
//! Every input is validated before any amount is computed, so a settlement is
//! either produced whole or not at all. Sub-component errors surface
//! unchanged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculators::{compute_price, PricingFactors};
use super::cancellation::{evaluate_cancellation, CancellationOutcome, CancellationWindow, RefundReason};
use super::commission::CommissionSchedule;
use super::error::PricingError;
use super::money::Money;

/// Commission and cancellation configuration applied to a settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub commission: CommissionSchedule,
    pub cancellation: CancellationWindow,
}

impl PricingPolicy {
    pub fn validate(&self) -> Result<(), PricingError> {
        self.commission.validate()?;
        self.cancellation.validate()?;
        Ok(())
    }
}

/// Timing of a cancellation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancellationRequest {
    pub booking_start: DateTime<Utc>,
    pub request_time: DateTime<Utc>,
}

/// Final allocation of a booking's price.
///
/// `commission_amount + provider_payout + refund == final_price`. Without a
/// cancellation (or with a `None` refund) this is the plain commission split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettlementResult {
    pub final_price: Money,
    pub commission_rate: Decimal,
    pub commission_amount: Money,
    pub provider_payout: Money,
    pub cancellation: Option<CancellationOutcome>,
}

impl SettlementResult {
    pub fn refund(&self) -> Option<&Money> {
        self.cancellation.as_ref().map(|c| &c.refund)
    }

    pub fn refund_reason(&self) -> Option<RefundReason> {
        self.cancellation.as_ref().map(|c| c.reason)
    }

    /// Commission, payout and refund add back up to the final price.
    pub fn is_balanced(&self) -> bool {
        let refund = self
            .refund()
            .map(Money::amount)
            .unwrap_or(0);
        self.commission_amount
            .amount()
            .checked_add(self.provider_payout.amount())
            .and_then(|sum| sum.checked_add(refund))
            == Some(self.final_price.amount())
    }
}

/// Compute the settlement for a booking.
///
/// On a `FULL` refund the settlement is void: the whole price goes back to the
/// customer and neither side keeps anything. On `PARTIAL`, platform and
/// provider each keep their original share scaled by
/// `1 - refund_percentage / 100`; the rounding residue goes to the provider,
/// up to its uncancelled payout. Anything beyond that stays with the platform.
pub fn settle(
    factors: &PricingFactors,
    policy: &PricingPolicy,
    cancellation: Option<&CancellationRequest>,
) -> Result<SettlementResult, PricingError> {
    factors.validate()?;
    policy.validate()?;

    let final_price = compute_price(factors)?;
    let split = policy.commission.split(&final_price)?;

    let Some(request) = cancellation else {
        tracing::debug!(
            price = %final_price,
            rate = %split.rate,
            commission = split.commission_amount.amount(),
            "Settled booking"
        );
        return Ok(SettlementResult {
            final_price,
            commission_rate: split.rate,
            commission_amount: split.commission_amount,
            provider_payout: split.provider_payout,
            cancellation: None,
        });
    };

    let outcome = evaluate_cancellation(
        request.booking_start,
        request.request_time,
        &policy.cancellation,
        &final_price,
    )?;

    let (commission_amount, provider_payout) = match outcome.reason {
        RefundReason::None => (split.commission_amount, split.provider_payout),
        RefundReason::Full => (final_price.zeroed(), final_price.zeroed()),
        RefundReason::Partial => {
            let retained = final_price.checked_sub(&outcome.refund)?;
            let keep = Decimal::ONE - policy.cancellation.refund_fraction();
            let commission = split.commission_amount.scale(keep)?;
            // Never let the platform keep more than what is left.
            let commission = if commission.amount() > retained.amount() {
                retained.clone()
            } else {
                commission
            };
            let payout = retained.checked_sub(&commission)?;
            // The residue goes to the provider, but a refund never raises its payout.
            if payout.amount() > split.provider_payout.amount() {
                let payout = split.provider_payout.clone();
                let commission = retained.checked_sub(&payout)?;
                (commission, payout)
            } else {
                (commission, payout)
            }
        }
    };

    tracing::debug!(
        price = %final_price,
        reason = ?outcome.reason,
        refund = outcome.refund.amount(),
        hours_until_start = outcome.hours_until_start,
        "Settled cancelled booking"
    );

    Ok(SettlementResult {
        final_price,
        commission_rate: split.rate,
        commission_amount,
        provider_payout,
        cancellation: Some(outcome),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::commission::CommissionTier;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn usd(amount: i64) -> Money {
        Money::new(amount, "USD").unwrap()
    }

    fn policy() -> PricingPolicy {
        PricingPolicy {
            commission: CommissionSchedule::new(
                dec!(0.15),
                vec![
                    CommissionTier { threshold: usd(100000), rate: dec!(0.10) },
                    CommissionTier { threshold: usd(500000), rate: dec!(0.08) },
                    CommissionTier { threshold: usd(1000000), rate: dec!(0.05) },
                ],
            ),
            cancellation: CancellationWindow::default(),
        }
    }

    fn factors() -> PricingFactors {
        PricingFactors {
            base_price: usd(10000),
            demand_factor: dec!(1.5),
            location_factor: dec!(1.2),
            time_factor: dec!(1.0),
        }
    }

    fn cancel(hours_before: i64) -> CancellationRequest {
        let booking_start = Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap();
        CancellationRequest {
            booking_start,
            request_time: booking_start - Duration::hours(hours_before),
        }
    }

    #[test]
    fn test_settle_without_cancellation() {
        let result = settle(&factors(), &policy(), None).unwrap();
        assert_eq!(result.final_price, usd(18000));
        assert_eq!(result.commission_rate, dec!(0.15));
        assert_eq!(result.commission_amount, usd(2700));
        assert_eq!(result.provider_payout, usd(15300));
        assert!(result.refund().is_none());
        assert!(result.refund_reason().is_none());
        assert!(result.is_balanced());
    }

    #[test]
    fn test_settle_full_refund_voids_settlement() {
        let result = settle(&factors(), &policy(), Some(&cancel(30))).unwrap();
        assert_eq!(result.refund_reason(), Some(RefundReason::Full));
        assert_eq!(result.refund(), Some(&usd(18000)));
        assert_eq!(result.commission_amount, usd(0));
        assert_eq!(result.provider_payout, usd(0));
        assert!(result.is_balanced());
    }

    #[test]
    fn test_settle_partial_refund_shares_proportionally() {
        let result = settle(&factors(), &policy(), Some(&cancel(15))).unwrap();
        assert_eq!(result.refund_reason(), Some(RefundReason::Partial));
        assert_eq!(result.refund(), Some(&usd(9000)));
        assert_eq!(result.commission_amount, usd(1350));
        assert_eq!(result.provider_payout, usd(7650));
        assert!(result.is_balanced());
    }

    #[test]
    fn test_settle_no_refund_keeps_split() {
        let result = settle(&factors(), &policy(), Some(&cancel(2))).unwrap();
        assert_eq!(result.refund_reason(), Some(RefundReason::None));
        assert_eq!(result.refund(), Some(&usd(0)));
        assert_eq!(result.commission_amount, usd(2700));
        assert_eq!(result.provider_payout, usd(15300));
        assert!(result.is_balanced());
    }

    #[test]
    fn test_settle_partial_high_rate_does_not_raise_payout() {
        let p = PricingPolicy {
            commission: CommissionSchedule::new(dec!(0.9), vec![]),
            cancellation: CancellationWindow::default(),
        };
        let f = PricingFactors::neutral(usd(1));

        let plain = settle(&f, &p, None).unwrap();
        assert_eq!(plain.commission_amount, usd(1));
        assert_eq!(plain.provider_payout, usd(0));

        // 50% of 1 rounds to 0, so nothing is refunded and nothing moves.
        let cancelled = settle(&f, &p, Some(&cancel(15))).unwrap();
        assert_eq!(cancelled.refund(), Some(&usd(0)));
        assert_eq!(cancelled.commission_amount, usd(1));
        assert_eq!(cancelled.provider_payout, usd(0));
        assert!(cancelled.is_balanced());
    }

    #[test]
    fn test_settle_partial_shares_shrink_for_any_rate() {
        let rates = [
            dec!(0),
            dec!(0.01),
            dec!(0.1),
            dec!(0.15),
            dec!(0.333),
            dec!(0.5),
            dec!(0.77),
            dec!(0.9),
            dec!(0.99),
            dec!(1),
        ];
        let percentages = [dec!(1), dec!(10), dec!(33), dec!(50), dec!(67), dec!(90), dec!(100)];

        for rate in rates {
            for pct in percentages {
                let p = PricingPolicy {
                    commission: CommissionSchedule::new(rate, vec![]),
                    cancellation: CancellationWindow {
                        refund_percentage: pct,
                        ..CancellationWindow::default()
                    },
                };
                let keep = Decimal::ONE - pct / Decimal::ONE_HUNDRED;

                for base in 0..=600 {
                    let f = PricingFactors::neutral(usd(base));
                    let plain = settle(&f, &p, None).unwrap();
                    let cancelled = settle(&f, &p, Some(&cancel(15))).unwrap();
                    let ctx = format!("rate {} pct {} base {}", rate, pct, base);

                    assert_eq!(cancelled.refund_reason(), Some(RefundReason::Partial), "{}", ctx);
                    assert!(cancelled.is_balanced(), "{}", ctx);
                    assert!(
                        cancelled.commission_amount.amount() <= plain.commission_amount.amount(),
                        "{}",
                        ctx
                    );
                    assert!(
                        cancelled.provider_payout.amount() <= plain.provider_payout.amount(),
                        "{}",
                        ctx
                    );

                    let exact_share = Decimal::from(plain.commission_amount.amount()) * keep;
                    let drift = (Decimal::from(cancelled.commission_amount.amount()) - exact_share).abs();
                    assert!(drift <= Decimal::ONE, "{} drift {}", ctx, drift);
                }
            }
        }
    }

    #[test]
    fn test_settle_fails_on_bad_factor_before_anything_else() {
        let mut f = factors();
        f.demand_factor = dec!(-1);
        let err = settle(&f, &policy(), Some(&cancel(15))).unwrap_err();
        assert_eq!(err.kind(), "invalid_factor");
    }

    #[test]
    fn test_settle_surfaces_window_error_even_without_cancellation() {
        let mut p = policy();
        p.cancellation.partial_refund_hours = 48;
        let err = settle(&factors(), &p, None).unwrap_err();
        assert_eq!(err.kind(), "invalid_window");
    }

    #[test]
    fn test_settle_surfaces_tier_table_error_untouched() {
        let mut p = policy();
        p.commission.tiers.reverse();
        let err = settle(&factors(), &p, None).unwrap_err();
        assert!(matches!(err, PricingError::InvalidTierTable { .. }));
    }

    #[test]
    fn test_settle_currency_mismatch() {
        let mut f = factors();
        f.base_price = Money::new(10000, "EUR").unwrap();
        let err = settle(&f, &policy(), None).unwrap_err();
        assert_eq!(err.kind(), "invalid_amount");
    }

    #[test]
    fn test_settle_is_idempotent() {
        let request = cancel(15);
        let a = settle(&factors(), &policy(), Some(&request)).unwrap();
        let b = settle(&factors(), &policy(), Some(&request)).unwrap();
        assert_eq!(a, b);
    }
}
