//! UPI QR payload classification and parsing.
//!
//! A scanned QR code hands us an untrusted string in one of several loosely
//! specified dialects. Classification is an ordered first-match-wins check so
//! precedence between dialects stays explicit and testable. Parsing a
//! recognized dialect can still fail (a payload without a payee address is
//! rejected outright), and nothing here performs I/O: identical input always
//! yields an identical result.

pub mod heuristic;
pub mod json_form;
pub mod url_form;
pub mod validator;

use crate::domain::value_objects::payment_intent::PaymentIntent;

/// The QR payload dialects we recognize, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrDialect {
    UrlForm,
    HeuristicForm,
    JsonForm,
    Unrecognized,
}

pub fn classify(raw: &str) -> QrDialect {
    if url_form::matches(raw) {
        QrDialect::UrlForm
    } else if heuristic::matches(raw) {
        QrDialect::HeuristicForm
    } else if json_form::matches(raw) {
        QrDialect::JsonForm
    } else {
        QrDialect::Unrecognized
    }
}

/// Parses a raw scanned string into a canonical payment intent, or `None`
/// when no dialect matches or the matched dialect yields no payee address.
pub fn parse(raw: &str) -> Option<PaymentIntent> {
    match classify(raw) {
        QrDialect::UrlForm => url_form::parse(raw),
        QrDialect::HeuristicForm => heuristic::parse(raw),
        QrDialect::JsonForm => json_form::parse(raw),
        QrDialect::Unrecognized => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_form_takes_precedence() {
        // contains '@' and a provider handle, but the scheme decides
        let raw = "upi://pay?pa=shop@paytm&pn=Shop";
        assert_eq!(classify(raw), QrDialect::UrlForm);
        let intent = parse(raw).unwrap();
        assert_eq!(intent.payee_address, "shop@paytm");
    }

    #[test]
    fn heuristic_form_wins_over_json_when_both_match() {
        // a JSON object whose address contains a provider handle also
        // satisfies the heuristic; the fixed evaluation order decides
        let raw = r#"{"vpa":"shop@ybl"}"#;
        assert_eq!(classify(raw), QrDialect::HeuristicForm);
    }

    #[test]
    fn json_form_is_reached_without_provider_handle() {
        let raw = r#"{"vpa":"a@b","amount":50}"#;
        assert_eq!(classify(raw), QrDialect::JsonForm);
    }

    #[test]
    fn unrecognized_payloads_return_none() {
        assert_eq!(classify("https://example.com"), QrDialect::Unrecognized);
        assert!(parse("https://example.com").is_none());
        assert!(parse("just some text").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn parsing_is_idempotent() {
        let raw = "upi://pay?pa=shop@upi&pn=Shop&am=150.50&tn=Lunch";
        let first = parse(raw).unwrap();
        let second = parse(raw).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn recognized_dialect_without_payee_is_rejected_not_reclassified() {
        // matches the URL dialect but has no pa parameter; the result is a
        // rejection, not a fall-through to another dialect
        assert_eq!(classify("upi://pay?pn=Shop"), QrDialect::UrlForm);
        assert!(parse("upi://pay?pn=Shop").is_none());
    }
}
