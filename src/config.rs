//! Process configuration: environment variables plus an optional JSON policy
//! file.
//!
//! The loaded [`PricingConfig`] is validated once and then shared read-only.
//! Reloading means building a new one and swapping the `Arc` at the boundary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::pricing::{
    CancellationWindow, CommissionSchedule, CommissionTier, HourRange, Money, PeakHourResolver,
    PricingError, PricingPolicy, ReceiptConfig,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILTER: &str = "booking_pricing=info,tower_http=info";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid pricing policy: {0}")]
    Invalid(#[from] PricingError),
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the default filter.
pub fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Settings read from the environment at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub log_format: LogFormat,
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Read `BIND_ADDR`, `LOG_FORMAT` and `PRICING_CONFIG` from the process
    /// environment. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let log_format = lookup("LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Pretty);
        let pricing = match lookup("PRICING_CONFIG") {
            Some(path) => PricingConfig::load(path)?,
            None => PricingConfig::default(),
        };

        Ok(Self {
            bind_addr,
            log_format,
            pricing,
        })
    }
}

/// Validated pricing configuration shared by all requests
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub currency: String,
    pub policy: PricingPolicy,
    pub resolver: PeakHourResolver,
    pub receipt: ReceiptConfig,
}

impl Default for PricingConfig {
    fn default() -> Self {
        // Built-in defaults always validate.
        PricingConfigFile::default()
            .into_config()
            .unwrap_or_else(|e| unreachable!("built-in pricing defaults are invalid: {}", e))
    }
}

impl PricingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded pricing config");
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let file: PricingConfigFile = serde_json::from_str(raw)?;
        Ok(file.into_config()?)
    }
}

/// On-disk shape of the pricing configuration
#[derive(Debug, Deserialize)]
struct PricingConfigFile {
    #[serde(default = "default_currency")]
    currency: String,
    #[serde(default)]
    commission: CommissionConfig,
    #[serde(default)]
    cancellation: CancellationWindow,
    #[serde(default)]
    peak_hours: PeakHoursConfig,
    #[serde(default)]
    location_factors: BTreeMap<String, Decimal>,
    #[serde(default)]
    receipt: ReceiptConfig,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Default for PricingConfigFile {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            commission: CommissionConfig::default(),
            cancellation: CancellationWindow::default(),
            peak_hours: PeakHoursConfig::default(),
            location_factors: BTreeMap::new(),
            receipt: ReceiptConfig::default(),
        }
    }
}

impl PricingConfigFile {
    fn into_config(self) -> Result<PricingConfig, PricingError> {
        Money::zero(self.currency.as_str())?;

        let tiers = self
            .commission
            .tiers
            .into_iter()
            .map(|tier| -> Result<CommissionTier, PricingError> {
                Ok(CommissionTier {
                    threshold: Money::new(tier.threshold, self.currency.clone())?,
                    rate: tier.rate,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let policy = PricingPolicy {
            commission: CommissionSchedule::new(self.commission.default_rate, tiers),
            cancellation: self.cancellation,
        };
        policy.validate()?;

        let resolver = PeakHourResolver {
            demand_hours: self.peak_hours.demand_hours,
            demand_factor: self.peak_hours.demand_factor,
            time_hours: self.peak_hours.time_hours,
            time_factor: self.peak_hours.time_factor,
            location_factors: self.location_factors,
        };
        resolver.validate()?;

        Ok(PricingConfig {
            currency: self.currency,
            policy,
            resolver,
            receipt: self.receipt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CommissionConfig {
    default_rate: Decimal,
    #[serde(default)]
    tiers: Vec<TierConfig>,
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            default_rate: Decimal::new(15, 2),
            tiers: vec![
                TierConfig {
                    threshold: 100_000,
                    rate: Decimal::new(10, 2),
                },
                TierConfig {
                    threshold: 500_000,
                    rate: Decimal::new(8, 2),
                },
                TierConfig {
                    threshold: 1_000_000,
                    rate: Decimal::new(5, 2),
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
struct TierConfig {
    /// Minor units in the config currency
    threshold: i64,
    rate: Decimal,
}

#[derive(Debug, Deserialize)]
struct PeakHoursConfig {
    demand_hours: HourRange,
    demand_factor: Decimal,
    time_hours: HourRange,
    time_factor: Decimal,
}

impl Default for PeakHoursConfig {
    fn default() -> Self {
        let defaults = PeakHourResolver::default();
        Self {
            demand_hours: defaults.demand_hours,
            demand_factor: defaults.demand_factor,
            time_hours: defaults.time_hours,
            time_factor: defaults.time_factor,
        }
    }
}
