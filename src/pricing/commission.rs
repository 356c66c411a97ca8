//! Tiered platform commission.
//!
//! The applicable rate is the one attached to the highest threshold that is
//! less than or equal to the price. Below the lowest threshold the schedule's
//! default rate applies.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;
use super::money::Money;

/// One row of the tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub threshold: Money,
    pub rate: Decimal,
}

/// Tier table plus the rate used below its lowest threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSchedule {
    pub default_rate: Decimal,
    #[serde(default)]
    pub tiers: Vec<CommissionTier>,
}

/// Result of splitting a price between the platform and the provider.
///
/// `commission_amount + provider_payout == price` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommissionSplit {
    pub rate: Decimal,
    pub commission_amount: Money,
    pub provider_payout: Money,
}

impl CommissionSchedule {
    pub fn new(default_rate: Decimal, tiers: Vec<CommissionTier>) -> Self {
        Self {
            default_rate,
            tiers,
        }
    }

    /// Check rates are within [0, 1] and thresholds strictly increase.
    pub fn validate(&self) -> Result<(), PricingError> {
        validate_tiers(&self.tiers, self.default_rate)
    }

    /// Rate for `price`; does not validate the table.
    pub fn rate_for(&self, price: &Money) -> Decimal {
        select_rate(&self.tiers, self.default_rate, price)
    }

    pub fn split(&self, final_price: &Money) -> Result<CommissionSplit, PricingError> {
        split_commission(final_price, &self.tiers, self.default_rate)
    }
}

fn validate_rate(rate: Decimal, what: &str) -> Result<(), PricingError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(PricingError::tier_table(format!(
            "{} rate {} is outside [0, 1]",
            what, rate
        )));
    }
    Ok(())
}

fn validate_tiers(tiers: &[CommissionTier], default_rate: Decimal) -> Result<(), PricingError> {
    validate_rate(default_rate, "default")?;

    for (i, tier) in tiers.iter().enumerate() {
        validate_rate(tier.rate, &format!("tier {}", i))?;
    }

    for (i, pair) in tiers.windows(2).enumerate() {
        let (lower, upper) = (&pair[0], &pair[1]);
        if lower.threshold.currency() != upper.threshold.currency() {
            return Err(PricingError::tier_table(format!(
                "tier {} currency {} differs from tier {} currency {}",
                i,
                lower.threshold.currency(),
                i + 1,
                upper.threshold.currency()
            )));
        }
        if upper.threshold.amount() <= lower.threshold.amount() {
            return Err(PricingError::tier_table(format!(
                "thresholds must be strictly increasing: tier {} ({}) is not above tier {} ({})",
                i + 1,
                upper.threshold,
                i,
                lower.threshold
            )));
        }
    }

    Ok(())
}

fn select_rate(tiers: &[CommissionTier], default_rate: Decimal, price: &Money) -> Decimal {
    tiers
        .iter()
        .rev()
        .find(|tier| tier.threshold.amount() <= price.amount())
        .map(|tier| tier.rate)
        .unwrap_or(default_rate)
}

/// Split `final_price` into platform commission and provider payout.
///
/// `commission = round(price * rate)`; the payout is the remainder, so any
/// rounding residue lands on the provider side.
pub fn split_commission(
    final_price: &Money,
    tiers: &[CommissionTier],
    default_rate: Decimal,
) -> Result<CommissionSplit, PricingError> {
    validate_tiers(tiers, default_rate)?;
    if let Some(first) = tiers.first() {
        first.threshold.ensure_same_currency(final_price)?;
    }

    let rate = select_rate(tiers, default_rate, final_price);
    let commission_amount = final_price.scale(rate)?;
    let provider_payout = final_price.checked_sub(&commission_amount)?;

    Ok(CommissionSplit {
        rate,
        commission_amount,
        provider_payout,
    })
}
