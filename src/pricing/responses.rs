//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators::PricingFactors;
use super::cancellation::{CancellationOutcome, RefundReason};
use super::commission::CommissionSplit;
use super::money::Money;
use super::receipt::Receipt;
use super::services::SettlementResult;

/// Multipliers that produced a quote
#[derive(Debug, Serialize)]
pub struct FactorsResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub demand_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub location_factor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub time_factor: Decimal,
}

/// Response for price quotes
#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub base_price: Money,
    pub factors: FactorsResponse,
    pub final_price: Money,
}

impl QuoteResponse {
    pub fn new(factors: PricingFactors, final_price: Money) -> Self {
        Self {
            factors: FactorsResponse {
                demand_factor: factors.demand_factor,
                location_factor: factors.location_factor,
                time_factor: factors.time_factor,
            },
            base_price: factors.base_price,
            final_price,
        }
    }
}

/// Response for commission split
#[derive(Debug, Serialize)]
pub struct CommissionResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    pub commission_amount: Money,
    pub provider_payout: Money,
}

impl From<CommissionSplit> for CommissionResponse {
    fn from(split: CommissionSplit) -> Self {
        Self {
            rate: split.rate,
            commission_amount: split.commission_amount,
            provider_payout: split.provider_payout,
        }
    }
}

/// Response for cancellation evaluation
#[derive(Debug, Serialize)]
pub struct CancellationResponse {
    pub refund: Money,
    pub reason: RefundReason,
    pub hours_until_start: i64,
}

impl From<CancellationOutcome> for CancellationResponse {
    fn from(outcome: CancellationOutcome) -> Self {
        Self {
            refund: outcome.refund,
            reason: outcome.reason,
            hours_until_start: outcome.hours_until_start,
        }
    }
}

/// Response for settlement
#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub final_price: Money,
    #[serde(with = "rust_decimal::serde::str")]
    pub commission_rate: Decimal,
    pub commission_amount: Money,
    pub provider_payout: Money,
    pub refund: Option<Money>,
    pub refund_reason: Option<RefundReason>,
}

impl From<SettlementResult> for SettlementResponse {
    fn from(result: SettlementResult) -> Self {
        let (refund, refund_reason) = match result.cancellation {
            Some(outcome) => (Some(outcome.refund), Some(outcome.reason)),
            None => (None, None),
        };
        Self {
            final_price: result.final_price,
            commission_rate: result.commission_rate,
            commission_amount: result.commission_amount,
            provider_payout: result.provider_payout,
            refund,
            refund_reason,
        }
    }
}

/// Response for receipt issuance
#[derive(Debug, Serialize)]
pub struct ReceiptResponse {
    pub receipt_number: String,
    pub issued_at: DateTime<Utc>,
    pub settlement: SettlementResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_png_base64: Option<String>,
}

impl From<Receipt> for ReceiptResponse {
    fn from(receipt: Receipt) -> Self {
        Self {
            receipt_number: receipt.receipt_number,
            issued_at: receipt.issued_at,
            settlement: receipt.settlement.into(),
            qr_code_png_base64: receipt.qr_code_png_base64,
        }
    }
}

/// Generic pricing error response
#[derive(Debug, Serialize)]
pub struct PricingErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
