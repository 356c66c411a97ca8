use anyhow::Context;
use booking_pricing::config::{init_logging, AppConfig};
use booking_pricing::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    init_logging(config.log_format);

    tracing::info!(
        currency = %config.pricing.currency,
        tiers = config.pricing.policy.commission.tiers.len(),
        "Pricing policy loaded"
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app(AppState::new(config.pricing)))
        .await
        .context("server error")?;

    Ok(())
}
