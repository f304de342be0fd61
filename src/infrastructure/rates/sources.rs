use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use serde::Deserialize;
use tracing::error;

use super::rate_converter::RateSource;

fn coin_id(asset: &str) -> Option<&'static str> {
    match asset.to_ascii_uppercase().as_str() {
        "USDT" => Some("tether"),
        "USDC" => Some("usd-coin"),
        "DAI" => Some("dai"),
        _ => None,
    }
}

async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = match resp.text().await {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => "<empty response body>".to_string(),
        Err(err) => format!("<failed to read response body: {err}>"),
    };

    error!(
        status = %status,
        response_body = %body,
        context = %context,
        "rate feed request failed"
    );

    anyhow::bail!("rate feed request failed: {} (status {})", context, status);
}

/// CoinGecko simple-price feed.
/// https://docs.coingecko.com/reference/simple-price
pub struct CoingeckoSource {
    http: reqwest::Client,
    base_url: String,
}

impl CoingeckoSource {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RateSource for CoingeckoSource {
    async fn fetch_rate(&self, from_currency: &str, to_currency: &str) -> Result<BigDecimal> {
        let coin = coin_id(from_currency)
            .ok_or_else(|| anyhow::anyhow!("no CoinGecko id for asset {from_currency}"))?;
        let vs_currency = to_currency.to_ascii_lowercase();

        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}",
            self.base_url, coin, vs_currency
        );

        let resp = self.http.get(&url).send().await?;
        let resp = ensure_success(resp, "coingecko simple price").await?;

        let parsed: HashMap<String, HashMap<String, f64>> = resp.json().await?;
        let rate = parsed
            .get(coin)
            .and_then(|prices| prices.get(&vs_currency))
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!("coingecko response missing {coin}/{vs_currency} price")
            })?;

        Ok(BigDecimal::try_from(rate)?)
    }
}

/// Binance-style ticker feed, used as the secondary.
/// https://binance-docs.github.io/apidocs/spot/en/#symbol-price-ticker
pub struct TickerSource {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: String,
}

impl TickerSource {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RateSource for TickerSource {
    async fn fetch_rate(&self, from_currency: &str, to_currency: &str) -> Result<BigDecimal> {
        let symbol = format!(
            "{}{}",
            from_currency.to_ascii_uppercase(),
            to_currency.to_ascii_uppercase()
        );

        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol);

        let resp = self.http.get(&url).send().await?;
        let resp = ensure_success(resp, "ticker price").await?;

        let parsed: TickerResponse = resp.json().await?;
        let rate = parsed
            .price
            .parse::<BigDecimal>()
            .map_err(|err| anyhow::anyhow!("ticker returned unparsable price: {err}"))?;

        Ok(rate)
    }
}
