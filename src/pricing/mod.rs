//! Pricing engine module.
//!
//! Dynamic price computation, tiered commission split and time-windowed
//! cancellation refunds, composed into a single settlement. Everything below
//! `routes`, `requests` and `responses` is pure and synchronous.

pub mod calculators;
pub mod cancellation;
pub mod commission;
pub mod error;
pub mod money;
pub mod receipt;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;

// Re-export commonly used items
pub use calculators::{compute_price, factor_from_f64, quote, FactorResolver, HourRange, PeakHourResolver, PricingFactors};
pub use cancellation::{evaluate_cancellation, hours_until_start, CancellationOutcome, CancellationWindow, RefundReason};
pub use commission::{split_commission, CommissionSchedule, CommissionSplit, CommissionTier};
pub use error::PricingError;
pub use money::{round_money, Money};
pub use receipt::{issue_receipt, Receipt, ReceiptConfig, ReceiptError};
pub use routes::router;
pub use services::{settle, CancellationRequest, PricingPolicy, SettlementResult};
