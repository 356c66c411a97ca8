//! Core pricing calculation functions.
//!
//! Pure functions for pricing math. No clock reads: the hour of day is always
//! passed in by the caller.

use std::collections::BTreeMap;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;
use super::money::Money;

/// Inputs to [`compute_price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingFactors {
    pub base_price: Money,
    pub demand_factor: Decimal,
    pub location_factor: Decimal,
    pub time_factor: Decimal,
}

impl PricingFactors {
    /// Factors that leave the base price unchanged.
    pub fn neutral(base_price: Money) -> Self {
        Self {
            base_price,
            demand_factor: Decimal::ONE,
            location_factor: Decimal::ONE,
            time_factor: Decimal::ONE,
        }
    }

    /// Reject negative multipliers. Zero is a valid (free) factor.
    pub fn validate(&self) -> Result<(), PricingError> {
        validate_factor("demand", self.demand_factor)?;
        validate_factor("location", self.location_factor)?;
        validate_factor("time", self.time_factor)?;
        Ok(())
    }
}

fn validate_factor(name: &'static str, value: Decimal) -> Result<(), PricingError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PricingError::factor(
            name,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

/// Convert a floating-point multiplier into an exact decimal factor.
///
/// Fails with `InvalidFactor` for NaN, infinities and negative values.
pub fn factor_from_f64(name: &'static str, value: f64) -> Result<Decimal, PricingError> {
    if !value.is_finite() {
        return Err(PricingError::factor(name, format!("must be finite, got {}", value)));
    }
    let factor = Decimal::from_f64(value)
        .ok_or_else(|| PricingError::factor(name, format!("{} is out of range", value)))?;
    validate_factor(name, factor)?;
    Ok(factor)
}

/// Compute the quoted price: `base * demand * location * time`.
///
/// The product of the factors is exact; rounding to a minor unit happens once,
/// on the final amount.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use booking_pricing::pricing::{compute_price, Money, PricingFactors};
///
/// let factors = PricingFactors {
///     base_price: Money::new(10000, "USD").unwrap(),
///     demand_factor: dec!(1.5),
///     location_factor: dec!(1.2),
///     time_factor: dec!(1.0),
/// };
/// assert_eq!(compute_price(&factors).unwrap().amount(), 18000);
/// ```
pub fn compute_price(factors: &PricingFactors) -> Result<Money, PricingError> {
    factors.validate()?;

    let multiplier = factors
        .demand_factor
        .checked_mul(factors.location_factor)
        .and_then(|m| m.checked_mul(factors.time_factor))
        .ok_or_else(|| PricingError::amount("factor product overflow"))?;

    factors.base_price.scale(multiplier)
}

/// Strategy turning booking context into pricing factors.
///
/// Implementations must be deterministic in their inputs.
pub trait FactorResolver {
    fn resolve(
        &self,
        base_price: Money,
        hour_of_day: u32,
        location: Option<&str>,
    ) -> Result<PricingFactors, PricingError>;
}

/// Half-open hour range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.start <= hour && hour < self.end
    }

    fn validate(&self, name: &'static str) -> Result<(), PricingError> {
        if self.start > self.end || self.end > 24 {
            return Err(PricingError::factor(
                name,
                format!("hour range {}..{} is not within 0..24", self.start, self.end),
            ));
        }
        Ok(())
    }
}

/// Default resolver: evening demand peak, morning time peak and a coarse
/// per-zone location multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakHourResolver {
    #[serde(default = "default_demand_hours")]
    pub demand_hours: HourRange,
    #[serde(default = "default_demand_factor")]
    pub demand_factor: Decimal,
    #[serde(default = "default_time_hours")]
    pub time_hours: HourRange,
    #[serde(default = "default_time_factor")]
    pub time_factor: Decimal,
    /// Zone code -> multiplier. Unknown or missing zones are neutral.
    #[serde(default)]
    pub location_factors: BTreeMap<String, Decimal>,
}

fn default_demand_hours() -> HourRange {
    HourRange::new(18, 21)
}

fn default_demand_factor() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

fn default_time_hours() -> HourRange {
    HourRange::new(6, 9)
}

fn default_time_factor() -> Decimal {
    Decimal::new(12, 1) // 1.2
}

impl Default for PeakHourResolver {
    fn default() -> Self {
        Self {
            demand_hours: default_demand_hours(),
            demand_factor: default_demand_factor(),
            time_hours: default_time_hours(),
            time_factor: default_time_factor(),
            location_factors: BTreeMap::new(),
        }
    }
}

impl PeakHourResolver {
    pub fn validate(&self) -> Result<(), PricingError> {
        self.demand_hours.validate("demand")?;
        self.time_hours.validate("time")?;
        validate_factor("demand", self.demand_factor)?;
        validate_factor("time", self.time_factor)?;
        for factor in self.location_factors.values() {
            validate_factor("location", *factor)?;
        }
        Ok(())
    }
}

impl FactorResolver for PeakHourResolver {
    fn resolve(
        &self,
        base_price: Money,
        hour_of_day: u32,
        location: Option<&str>,
    ) -> Result<PricingFactors, PricingError> {
        if hour_of_day > 23 {
            return Err(PricingError::factor(
                "time",
                format!("hour of day must be 0..=23, got {}", hour_of_day),
            ));
        }

        let demand_factor = if self.demand_hours.contains(hour_of_day) {
            self.demand_factor
        } else {
            Decimal::ONE
        };
        let time_factor = if self.time_hours.contains(hour_of_day) {
            self.time_factor
        } else {
            Decimal::ONE
        };
        let location_factor = location
            .and_then(|zone| self.location_factors.get(zone))
            .copied()
            .unwrap_or(Decimal::ONE);

        Ok(PricingFactors {
            base_price,
            demand_factor,
            location_factor,
            time_factor,
        })
    }
}

/// Resolve factors for the booking context, then price them.
pub fn quote(
    resolver: &dyn FactorResolver,
    base_price: Money,
    hour_of_day: u32,
    location: Option<&str>,
) -> Result<(PricingFactors, Money), PricingError> {
    let factors = resolver.resolve(base_price, hour_of_day, location)?;
    let price = compute_price(&factors)?;
    Ok((factors, price))
}
