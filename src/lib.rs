//! Booking pricing and settlement.
//!
//! The [`pricing`] module is a pure computation library: quote a price from
//! demand/location/time factors, split it into platform commission and
//! provider payout, and work out cancellation refunds. [`app`] exposes the
//! same operations over HTTP/JSON for the booking workflow.

pub mod config;
pub mod error;
pub mod pricing;

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::config::PricingConfig;

/// Shared, read-only application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PricingConfig>,
}

impl AppState {
    pub fn new(config: PricingConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/pricing", pricing::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
