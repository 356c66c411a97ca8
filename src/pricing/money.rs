//! Fixed-point money in integer minor units.
//!
//! Amounts are never negative and never held in floating point. Scaling by a
//! decimal factor goes through [`round_money`] exactly once.

use std::fmt;

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PricingError;

/// Round to a whole minor unit using banker's rounding (ROUND_HALF_EVEN).
///
/// Banker's rounding rounds to the nearest even number when the value is exactly
/// halfway between two possibilities. This reduces cumulative rounding bias.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use booking_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5)), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5)), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1234.49)), dec!(1234));
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
}

/// Monetary value: non-negative integer minor units tagged with a currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "MoneyRepr", into = "MoneyRepr")]
pub struct Money {
    amount: i64,
    currency: String,
}

/// Wire shape of [`Money`]; validated on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MoneyRepr {
    amount: i64,
    currency: String,
}

impl TryFrom<MoneyRepr> for Money {
    type Error = PricingError;

    fn try_from(repr: MoneyRepr) -> Result<Self, Self::Error> {
        Money::new(repr.amount, repr.currency)
    }
}

impl From<Money> for MoneyRepr {
    fn from(money: Money) -> Self {
        MoneyRepr {
            amount: money.amount,
            currency: money.currency,
        }
    }
}

impl Money {
    /// Build a money value from minor units.
    ///
    /// Fails with `InvalidAmount` for negative amounts or a currency code that
    /// is not three ASCII upper-case letters.
    pub fn new(amount: i64, currency: impl Into<String>) -> Result<Self, PricingError> {
        let currency = currency.into();
        validate_currency(&currency)?;
        if amount < 0 {
            return Err(PricingError::amount(format!(
                "amount must not be negative, got {} {}",
                amount, currency
            )));
        }
        Ok(Self { amount, currency })
    }

    /// Zero in the given currency.
    pub fn zero(currency: impl Into<String>) -> Result<Self, PricingError> {
        Self::new(0, currency)
    }

    /// Zero in the same currency as `self`.
    pub fn zeroed(&self) -> Self {
        Self {
            amount: 0,
            currency: self.currency.clone(),
        }
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Fail with `InvalidAmount` unless both operands share a currency.
    pub fn ensure_same_currency(&self, other: &Money) -> Result<(), PricingError> {
        if self.currency != other.currency {
            return Err(PricingError::amount(format!(
                "currency mismatch: {} vs {}",
                self.currency, other.currency
            )));
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money, PricingError> {
        self.ensure_same_currency(other)?;
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| PricingError::amount("addition overflow"))?;
        Money::new(amount, self.currency.clone())
    }

    /// Subtract, failing if the result would be negative.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, PricingError> {
        self.ensure_same_currency(other)?;
        if other.amount > self.amount {
            return Err(PricingError::amount(format!(
                "subtraction underflow: {} - {}",
                self, other
            )));
        }
        Money::new(self.amount - other.amount, self.currency.clone())
    }

    /// Multiply by an exact decimal factor, rounding once to a minor unit.
    pub fn scale(&self, factor: Decimal) -> Result<Money, PricingError> {
        let scaled = self
            .to_decimal()
            .checked_mul(factor)
            .ok_or_else(|| PricingError::amount(format!("overflow scaling {} by {}", self, factor)))?;
        Money::from_decimal(scaled, &self.currency)
    }

    pub(crate) fn to_decimal(&self) -> Decimal {
        Decimal::from(self.amount)
    }

    /// Round an unrounded minor-unit value and convert it back into money.
    pub(crate) fn from_decimal(value: Decimal, currency: &str) -> Result<Money, PricingError> {
        let amount = round_money(value)
            .to_i64()
            .ok_or_else(|| PricingError::amount(format!("{} does not fit in minor units", value)))?;
        Money::new(amount, currency)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

fn validate_currency(currency: &str) -> Result<(), PricingError> {
    let well_formed = currency.len() == 3 && currency.bytes().all(|b| b.is_ascii_uppercase());
    if !well_formed {
        return Err(PricingError::amount(format!(
            "currency must be a three-letter upper-case code, got {:?}",
            currency
        )));
    }
    Ok(())
}
