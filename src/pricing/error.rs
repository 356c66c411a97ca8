//! Error taxonomy for the pricing core.
//!
//! Every variant is a local validation failure raised before any computation
//! proceeds. Nothing here is transient, so callers should fix the input or
//! configuration rather than retry.

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// A price multiplier was negative, NaN or infinite.
    #[error("Invalid {name} factor: {reason}")]
    InvalidFactor { name: &'static str, reason: String },

    /// Thresholds not strictly increasing, or a rate outside [0, 1].
    #[error("Invalid commission tier table: {reason}")]
    InvalidTierTable { reason: String },

    /// `free_cancellation_hours >= partial_refund_hours >= 0` does not hold,
    /// or the refund percentage is outside [0, 100].
    #[error("Invalid cancellation window: {reason}")]
    InvalidWindow { reason: String },

    /// Negative money, malformed currency, mismatched currencies or overflow.
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },
}

impl PricingError {
    /// Stable machine-readable name, used in error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PricingError::InvalidFactor { .. } => "invalid_factor",
            PricingError::InvalidTierTable { .. } => "invalid_tier_table",
            PricingError::InvalidWindow { .. } => "invalid_window",
            PricingError::InvalidAmount { .. } => "invalid_amount",
        }
    }

    pub(crate) fn factor(name: &'static str, reason: impl Into<String>) -> Self {
        PricingError::InvalidFactor {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn tier_table(reason: impl Into<String>) -> Self {
        PricingError::InvalidTierTable {
            reason: reason.into(),
        }
    }

    pub(crate) fn window(reason: impl Into<String>) -> Self {
        PricingError::InvalidWindow {
            reason: reason.into(),
        }
    }

    pub(crate) fn amount(reason: impl Into<String>) -> Self {
        PricingError::InvalidAmount {
            reason: reason.into(),
        }
    }
}
