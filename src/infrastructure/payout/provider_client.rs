use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use hmac::{Hmac, Mac};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::error;

use crate::{
    application::usecases::payouts::PayoutGateway,
    domain::value_objects::{
        enums::payout_statuses::PayoutStatus,
        payouts::{PayoutInitiation, PayoutWebhookModel},
    },
};

type HmacSha256 = Hmac<Sha256>;

/// Client for the UPI payout provider built on reqwest. Webhook payloads are
/// authenticated with an HMAC-SHA256 over the raw body.
pub struct PayoutProviderClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    webhook_secret: String,
}

#[derive(Debug, Serialize)]
struct InitiatePayoutRequest<'a> {
    #[serde(rename = "referenceId")]
    reference_id: &'a str,
    #[serde(rename = "payeeUpiId")]
    payee_upi_id: &'a str,
    amount: String,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct InitiatePayoutResponse {
    #[serde(rename = "payoutId")]
    payout_id: String,
    status: String,
    #[serde(rename = "failureReason")]
    failure_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayoutStatusResponse {
    status: String,
}

impl PayoutProviderClient {
    pub fn new(base_url: String, api_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            webhook_secret,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            provider_request_id = ?request_id,
            response_body = %body,
            context = %context,
            "payout provider api request failed"
        );

        anyhow::bail!(
            "payout provider request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }
}

#[async_trait]
impl PayoutGateway for PayoutProviderClient {
    async fn initiate_payout(
        &self,
        reference_id: &str,
        merchant_upi_id: &str,
        amount_fiat: &BigDecimal,
    ) -> Result<PayoutInitiation> {
        let body = InitiatePayoutRequest {
            reference_id,
            payee_upi_id: merchant_upi_id,
            amount: amount_fiat.to_string(),
            currency: "INR",
        };

        let resp = self
            .http
            .post(format!("{}/v1/payouts", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "initiate payout").await?;

        let parsed: InitiatePayoutResponse = resp.json().await?;
        let accepted = !matches!(
            PayoutStatus::from_provider_str(&parsed.status),
            Some(PayoutStatus::Failed)
        );

        Ok(PayoutInitiation {
            payout_id: parsed.payout_id,
            accepted,
            failure_reason: parsed.failure_reason,
        })
    }

    async fn payout_status(&self, payout_id: &str) -> Result<PayoutStatus> {
        let resp = self
            .http
            .get(format!("{}/v1/payouts/{}", self.base_url, payout_id))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "payout status").await?;

        let parsed: PayoutStatusResponse = resp.json().await?;
        PayoutStatus::from_provider_str(&parsed.status)
            .ok_or_else(|| anyhow::anyhow!("provider returned unknown status {:?}", parsed.status))
    }

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PayoutWebhookModel> {
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())?;
        mac.update(payload);
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature.trim())?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid webhook signature");
        }

        let webhook: PayoutWebhookModel = serde_json::from_slice(payload)?;
        Ok(webhook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(secret: &str) -> PayoutProviderClient {
        PayoutProviderClient::new(
            "https://payouts.example".to_string(),
            "key".to_string(),
            secret.to_string(),
        )
    }

    fn sign(secret: &str, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_yields_parsed_webhook() {
        let payload = br#"{"payoutId":"pout_1","status":"success","transactionId":"utr-7"}"#;
        let signature = sign("whsec", payload);

        let webhook = client("whsec")
            .verify_webhook_signature(payload, &signature)
            .unwrap();
        assert_eq!(webhook.payout_id, "pout_1");
        assert_eq!(webhook.status, "success");
        assert_eq!(webhook.transaction_id.as_deref(), Some("utr-7"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"payoutId":"pout_1","status":"success"}"#;
        let signature = sign("other-secret", payload);

        let result = client("whsec").verify_webhook_signature(payload, &signature);
        assert!(result.is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = br#"{"payoutId":"pout_1","status":"success"}"#;
        let signature = sign("whsec", payload);
        let tampered = br#"{"payoutId":"pout_2","status":"success"}"#;

        let result = client("whsec").verify_webhook_signature(tampered, &signature);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_hex_signature_is_rejected() {
        let payload = br#"{"payoutId":"pout_1","status":"success"}"#;
        let result = client("whsec").verify_webhook_signature(payload, "not-hex");
        assert!(result.is_err());
    }
}
