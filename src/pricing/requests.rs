//! Request DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::money::Money;
use super::services::CancellationRequest;

/// Explicit, pre-resolved multipliers
#[derive(Debug, Deserialize)]
pub struct FactorsRequest {
    #[serde(with = "rust_decimal::serde::str")]
    pub demand_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub location_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub time_factor: Decimal,
}

/// Request to quote a price.
///
/// Either `factors` is given, or `hour_of_day` (plus an optional `location`
/// zone) is resolved through the configured resolver.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub base_price: Money,
    #[serde(default)]
    pub factors: Option<FactorsRequest>,
    #[serde(default)]
    pub hour_of_day: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Request to split a price into commission and payout
#[derive(Debug, Deserialize)]
pub struct CommissionRequest {
    pub final_price: Money,
}

/// Request to evaluate a cancellation
#[derive(Debug, Deserialize)]
pub struct EvaluateCancellationRequest {
    pub booking_start: DateTime<Utc>,
    pub request_time: DateTime<Utc>,
    pub final_price: Money,
}

/// Request to settle a booking, optionally cancelled
#[derive(Debug, Deserialize)]
pub struct SettlementRequest {
    #[serde(flatten)]
    pub quote: QuoteRequest,
    #[serde(default)]
    pub cancellation: Option<CancellationRequest>,
}
