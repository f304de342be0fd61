#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub database: Database,
    pub bridge: Bridge,
    pub rate_oracle: RateOracle,
    pub payout_provider: PayoutProvider,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

/// Addresses and currencies the bridge settles between.
#[derive(Debug, Clone)]
pub struct Bridge {
    pub treasury_address: String,
    pub asset_currency: String,
    pub fiat_currency: String,
    pub chain_explorer_base_url: String,
}

#[derive(Debug, Clone)]
pub struct RateOracle {
    pub primary_base_url: String,
    pub secondary_base_url: String,
    pub cache_ttl_seconds: u64,
    pub fallback_rate: String,
}

#[derive(Debug, Clone)]
pub struct PayoutProvider {
    pub base_url: String,
    pub api_key: String,
    pub webhook_secret: String,
    pub poll_interval_seconds: u64,
}
