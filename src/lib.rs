pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod services;

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Result;
use bigdecimal::BigDecimal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    application::usecases::{
        payments::PaymentUseCase, payouts::PayoutCoordinatorUseCase, qr_scan::QrScanUseCase,
    },
    infrastructure::{
        axum_http::{http_serve, routers},
        chain::rpc_client::ChainRpcClient,
        payout::provider_client::PayoutProviderClient,
        postgres::{postgres_connection, repositories::payments::PaymentLedgerPostgres},
        rates::{
            rate_converter::RateConverter,
            sources::{CoingeckoSource, TickerSource},
        },
    },
    services::payout_poller,
};

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&config.database.url)?;
    info!("Postgres connection has been established");

    let ledger_repository = Arc::new(PaymentLedgerPostgres::new(Arc::new(postgres_pool)));

    let rate_converter = Arc::new(RateConverter::new(
        CoingeckoSource::new(config.rate_oracle.primary_base_url.clone()),
        TickerSource::new(config.rate_oracle.secondary_base_url.clone()),
        Duration::from_secs(config.rate_oracle.cache_ttl_seconds),
        BigDecimal::from_str(&config.rate_oracle.fallback_rate)?,
    ));

    let chain_client = Arc::new(ChainRpcClient::new(
        config.bridge.chain_explorer_base_url.clone(),
    ));

    let payout_client = Arc::new(PayoutProviderClient::new(
        config.payout_provider.base_url.clone(),
        config.payout_provider.api_key.clone(),
        config.payout_provider.webhook_secret.clone(),
    ));

    let qr_scan_usecase = Arc::new(QrScanUseCase::new());

    let payment_usecase = Arc::new(PaymentUseCase::new(
        Arc::clone(&ledger_repository),
        Arc::clone(&rate_converter),
        config.bridge.asset_currency.clone(),
        config.bridge.fiat_currency.clone(),
    ));

    let payout_coordinator = Arc::new(PayoutCoordinatorUseCase::new(
        Arc::clone(&ledger_repository),
        chain_client,
        payout_client,
        config.bridge.treasury_address.clone(),
    ));

    tokio::spawn(payout_poller::run_poller_loop(
        Arc::clone(&payout_coordinator),
        Duration::from_secs(config.payout_provider.poll_interval_seconds),
    ));
    info!("Payout poller has been started");

    let api_routes = routers::qr_scan::routes(qr_scan_usecase)
        .merge(routers::payments::routes(payment_usecase))
        .merge(routers::payouts::routes(payout_coordinator));

    http_serve::start(config, api_routes).await?;

    Ok(())
}
