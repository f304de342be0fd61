use serde::{Deserialize, Serialize};

/// Placeholder payee name used when a QR payload carries no merchant name.
pub const UNKNOWN_MERCHANT: &str = "Unknown Merchant";

/// Request body for the scan endpoint: the raw string decoded from a QR code.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanQrModel {
    pub raw: String,
}

/// Canonical payment intent extracted from a scanned QR payload.
///
/// An intent is valid iff `payee_address` is non-empty; every other field is
/// advisory. The intent is ephemeral and is not persisted until the user
/// confirms the amount and a `Payment` row is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// UPI virtual payment address (VPA) of the payee, e.g. `shop@upi`.
    pub payee_address: String,
    pub payee_name: String,
    /// Decimal amount string when the QR carries one. May be absent, in which
    /// case the user supplies the amount downstream.
    pub amount: Option<String>,
    pub transaction_note: Option<String>,
    pub merchant_code: Option<String>,
    pub transaction_ref: Option<String>,
    /// The original scanned string, retained for audit and debugging.
    pub raw_payload: String,
}

impl PaymentIntent {
    pub fn new(payee_address: String, raw_payload: String) -> Self {
        Self {
            payee_address,
            payee_name: UNKNOWN_MERCHANT.to_string(),
            amount: None,
            transaction_note: None,
            merchant_code: None,
            transaction_ref: None,
            raw_payload,
        }
    }
}
