use thiserror::Error;
use tracing::warn;

use crate::domain::value_objects::payment_intent::PaymentIntent;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentRejection {
    #[error("payee address is missing")]
    MissingPayeeAddress,
}

/// Final gate before an intent leaves the parsing layer. The only hard
/// requirement is a non-empty payee address; the parsers already guarantee
/// this, but it is re-checked here since the intent drives an irreversible
/// transfer.
///
/// A non-numeric amount string is passed through unchanged: the amount-entry
/// step downstream re-validates whatever the user ends up paying, so a QR
/// with a garbage amount still scans. See DESIGN.md for the rationale.
pub fn validate(intent: PaymentIntent) -> Result<PaymentIntent, IntentRejection> {
    if intent.payee_address.trim().is_empty() {
        return Err(IntentRejection::MissingPayeeAddress);
    }

    if let Some(amount) = &intent.amount {
        if !is_numeric_string(amount) {
            warn!(
                amount,
                payee_address = %intent.payee_address,
                "scanned amount is not numeric, deferring to amount entry"
            );
        }
    }

    Ok(intent)
}

fn is_numeric_string(s: &str) -> bool {
    let mut seen_digit = false;
    let mut seen_dot = false;
    for c in s.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }
    seen_digit
}
