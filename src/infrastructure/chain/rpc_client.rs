use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, error};

use crate::{
    application::usecases::payouts::ChainGateway, domain::value_objects::chain::ChainTransaction,
};

/// Read-only client for a Blockscout-style chain explorer API. Only the
/// fields needed to verify an inbound transfer are deserialized.
pub struct ChainRpcClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    hash: String,
    status: Option<String>,
    to: Option<AddressParam>,
}

#[derive(Debug, Deserialize)]
struct AddressParam {
    hash: String,
}

impl ChainRpcClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
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
            "chain explorer api request failed"
        );

        anyhow::bail!("chain explorer request failed: {} (status {})", context, status);
    }
}

#[async_trait]
impl ChainGateway for ChainRpcClient {
    async fn lookup_transaction(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<ChainTransaction>> {
        let url = format!("{}/api/v2/transactions/{}", self.base_url, transaction_hash);

        let resp = self.http.get(&url).send().await?;

        // the explorer answers 404 for hashes it has never seen
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(transaction_hash, "chain: transaction not found");
            return Ok(None);
        }

        let resp = Self::ensure_success(resp, "lookup transaction").await?;
        let parsed: TransactionResponse = resp.json().await?;

        let Some(to) = parsed.to else {
            // contract creation has no `to`; it can never pay the treasury
            return Ok(Some(ChainTransaction {
                hash: parsed.hash,
                to_address: String::new(),
                succeeded: false,
            }));
        };

        Ok(Some(ChainTransaction {
            hash: parsed.hash,
            to_address: to.hash,
            succeeded: parsed.status.as_deref() == Some("ok"),
        }))
    }
}
