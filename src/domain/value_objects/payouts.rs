use serde::{Deserialize, Serialize};

/// Webhook payload delivered by the payout provider. The raw body is
/// HMAC-signed; this model is only deserialized after the signature has been
/// verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutWebhookModel {
    pub payout_id: String,
    pub status: String,
    pub transaction_id: Option<String>,
}

/// Result of asking the provider to initiate a payout. A rejected initiation
/// still carries the provider-side payout id so the attempt stays trackable.
#[derive(Debug, Clone)]
pub struct PayoutInitiation {
    pub payout_id: String,
    pub accepted: bool,
    pub failure_reason: Option<String>,
}
