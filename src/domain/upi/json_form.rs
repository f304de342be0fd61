use serde_json::{Map, Value};

use crate::domain::value_objects::payment_intent::{PaymentIntent, UNKNOWN_MERCHANT};

const ADDRESS_KEYS: &[&str] = &["upi", "vpa", "payeeAddress"];

/// The merchant-object dialect: a JSON object carrying one of the known
/// payee-address keys.
pub fn matches(raw: &str) -> bool {
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(Value::Object(map)) => ADDRESS_KEYS.iter().any(|key| map.contains_key(*key)),
        _ => false,
    }
}

pub fn parse(raw: &str) -> Option<PaymentIntent> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    let object = value.as_object()?;

    let payee_address = first_string(object, ADDRESS_KEYS)?;
    let payee_name = first_string(object, &["name", "merchantName", "payeeName"]);
    let amount = first_scalar(object, &["amount", "am"]);
    let transaction_note = first_string(object, &["note", "tn", "description"]);
    let merchant_code = first_scalar(object, &["merchantCode", "mc", "mid"]);

    Some(PaymentIntent {
        payee_address,
        payee_name: payee_name.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
        amount,
        transaction_note,
        merchant_code,
        // no JSON key maps onto the transaction reference; see DESIGN.md
        transaction_ref: None,
        raw_payload: raw.to_string(),
    })
}

fn first_string(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter_map(|value| value.as_str())
        .map(|s| s.to_string())
        .find(|s| !s.is_empty())
}

/// Like `first_string`, but coerces JSON numbers to their string rendering so
/// payloads such as `{"amount": 50}` behave like `{"amount": "50"}`.
fn first_scalar(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().filter_map(|key| object.get(*key)).find_map(|value| match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
