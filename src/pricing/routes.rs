//! HTTP routes for the pricing engine.

use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::error::{AppError, Result};
use crate::AppState;

use super::calculators::{compute_price, FactorResolver, PricingFactors};
use super::cancellation::evaluate_cancellation;
use super::receipt::issue_receipt;
use super::requests::{CommissionRequest, EvaluateCancellationRequest, QuoteRequest, SettlementRequest};
use super::responses::{
    CancellationResponse, CommissionResponse, QuoteResponse, ReceiptResponse, SettlementResponse,
};
use super::services::{settle, SettlementResult};

/// Pricing routes, mounted under `/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/quote", post(quote))
        .route("/commission", post(commission))
        .route("/cancellation", post(cancellation))
        .route("/settlement", post(settlement))
        .route("/receipt", post(receipt))
}

/// Turn a quote request into concrete factors, resolving context if needed.
fn resolve_factors(config: &PricingConfig, req: QuoteRequest) -> Result<PricingFactors> {
    match (req.factors, req.hour_of_day) {
        (Some(f), _) => Ok(PricingFactors {
            base_price: req.base_price,
            demand_factor: f.demand_factor,
            location_factor: f.location_factor,
            time_factor: f.time_factor,
        }),
        (None, Some(hour)) => {
            Ok(config
                .resolver
                .resolve(req.base_price, hour, req.location.as_deref())?)
        }
        (None, None) => Err(AppError::BadRequest(
            "either factors or hour_of_day is required".to_string(),
        )),
    }
}

fn settle_request(config: &PricingConfig, req: SettlementRequest) -> Result<SettlementResult> {
    let factors = resolve_factors(config, req.quote)?;
    let result = settle(&factors, &config.policy, req.cancellation.as_ref())?;
    if !result.is_balanced() {
        return Err(AppError::Internal(format!(
            "settlement does not balance: {:?}",
            result
        )));
    }
    Ok(result)
}

async fn quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let factors = resolve_factors(&state.config, req)?;
    let final_price = compute_price(&factors)?;
    Ok(Json(QuoteResponse::new(factors, final_price)))
}

async fn commission(
    State(state): State<AppState>,
    Json(req): Json<CommissionRequest>,
) -> Result<Json<CommissionResponse>> {
    let split = state.config.policy.commission.split(&req.final_price)?;
    Ok(Json(split.into()))
}

async fn cancellation(
    State(state): State<AppState>,
    Json(req): Json<EvaluateCancellationRequest>,
) -> Result<Json<CancellationResponse>> {
    let outcome = evaluate_cancellation(
        req.booking_start,
        req.request_time,
        &state.config.policy.cancellation,
        &req.final_price,
    )?;
    Ok(Json(outcome.into()))
}

async fn settlement(
    State(state): State<AppState>,
    Json(req): Json<SettlementRequest>,
) -> Result<Json<SettlementResponse>> {
    let result = settle_request(&state.config, req)?;
    Ok(Json(result.into()))
}

async fn receipt(
    State(state): State<AppState>,
    Json(req): Json<SettlementRequest>,
) -> Result<Json<ReceiptResponse>> {
    let result = settle_request(&state.config, req)?;
    let receipt = issue_receipt(&state.config.receipt, result, Utc::now(), Uuid::new_v4())?;
    tracing::info!(receipt_number = %receipt.receipt_number, "Issued receipt");
    Ok(Json(receipt.into()))
}
