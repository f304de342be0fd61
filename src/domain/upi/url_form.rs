use url::Url;

use crate::domain::value_objects::payment_intent::{PaymentIntent, UNKNOWN_MERCHANT};

/// The standard NPCI deep-link dialect: `upi://pay?pa=...&pn=...`.
pub fn matches(raw: &str) -> bool {
    raw.trim_start()
        .to_ascii_lowercase()
        .starts_with("upi://pay")
}

pub fn parse(raw: &str) -> Option<PaymentIntent> {
    let trimmed = raw.trim();

    // `upi:` is not a scheme the url crate treats as special, so rewrite it
    // to `https:` purely for parsing. The query string is untouched, so
    // captured parameter values are identical either way.
    let rest = trimmed.get("upi".len()..)?;
    let parsed = Url::parse(&format!("https{rest}")).ok()?;

    let mut payee_address: Option<String> = None;
    let mut payee_name: Option<String> = None;
    let mut amount: Option<String> = None;
    let mut transaction_note: Option<String> = None;
    let mut merchant_code: Option<String> = None;
    let mut transaction_ref: Option<String> = None;

    // first occurrence within an alias group wins
    for (key, value) in parsed.query_pairs() {
        if value.is_empty() {
            continue;
        }
        let value = value.into_owned();
        match key.as_ref() {
            "pa" if payee_address.is_none() => payee_address = Some(value),
            "pn" if payee_name.is_none() => payee_name = Some(value),
            "am" | "amount" if amount.is_none() => amount = Some(value),
            "tn" | "note" if transaction_note.is_none() => transaction_note = Some(value),
            "mc" | "mid" if merchant_code.is_none() => merchant_code = Some(value),
            "tr" | "tid" if transaction_ref.is_none() => transaction_ref = Some(value),
            _ => {}
        }
    }

    let payee_address = payee_address?;

    Some(PaymentIntent {
        payee_address,
        payee_name: payee_name.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
        amount,
        transaction_note,
        merchant_code,
        transaction_ref,
        raw_payload: raw.to_string(),
    })
}
