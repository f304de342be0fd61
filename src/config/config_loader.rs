use anyhow::{Ok, Result};

use super::config_model::{
    Bridge, Database, DotEnvyConfig, PayoutProvider, RateOracle, Server,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let bridge = Bridge {
        treasury_address: std::env::var("BRIDGE_TREASURY_ADDRESS")
            .expect("BRIDGE_TREASURY_ADDRESS is invalid"),
        asset_currency: std::env::var("BRIDGE_ASSET_CURRENCY").unwrap_or("USDT".to_string()),
        fiat_currency: std::env::var("BRIDGE_FIAT_CURRENCY").unwrap_or("INR".to_string()),
        chain_explorer_base_url: std::env::var("CHAIN_EXPLORER_BASE_URL")
            .expect("CHAIN_EXPLORER_BASE_URL is invalid"),
    };

    let rate_oracle = RateOracle {
        primary_base_url: std::env::var("RATE_PRIMARY_BASE_URL")
            .unwrap_or("https://api.coingecko.com".to_string()),
        secondary_base_url: std::env::var("RATE_SECONDARY_BASE_URL")
            .unwrap_or("https://api.binance.com".to_string()),
        cache_ttl_seconds: std::env::var("RATE_CACHE_TTL_SECONDS")
            .unwrap_or("60".to_string())
            .parse()?,
        fallback_rate: std::env::var("RATE_FALLBACK_RATE").expect("RATE_FALLBACK_RATE is invalid"),
    };

    let payout_provider = PayoutProvider {
        base_url: std::env::var("PAYOUT_PROVIDER_BASE_URL")
            .expect("PAYOUT_PROVIDER_BASE_URL is invalid"),
        api_key: std::env::var("PAYOUT_PROVIDER_API_KEY")
            .expect("PAYOUT_PROVIDER_API_KEY is invalid"),
        webhook_secret: std::env::var("PAYOUT_PROVIDER_WEBHOOK_SECRET")
            .expect("PAYOUT_PROVIDER_WEBHOOK_SECRET is invalid"),
        poll_interval_seconds: std::env::var("PAYOUT_POLL_INTERVAL_SECONDS")
            .unwrap_or("5".to_string())
            .parse()?,
    };

    Ok(DotEnvyConfig {
        server,
        database,
        bridge,
        rate_oracle,
        payout_provider,
    })
}
