use crate::domain::value_objects::payment_intent::{PaymentIntent, UNKNOWN_MERCHANT};

/// Provider handle substrings that mark a bare text blob as UPI-ish. The
/// list is an allow-list and is meant to grow as new PSP handles show up in
/// the wild.
const PROVIDER_HANDLES: &[&str] = &[
    "paytm", "phonepe", "gpay", "ybl", "okaxis", "upi", "ibl", "axl", "apl",
];

/// The bare-VPA dialect: free text that contains a `@`-style address with a
/// known provider handle, e.g. a sticker that just prints the shop's VPA.
pub fn matches(raw: &str) -> bool {
    if !raw.contains('@') {
        return false;
    }
    let lower = raw.to_lowercase();
    PROVIDER_HANDLES.iter().any(|handle| lower.contains(handle))
}

pub fn parse(raw: &str) -> Option<PaymentIntent> {
    let mut payee_address: Option<String> = None;
    let mut payee_name: Option<String> = None;
    let mut amount: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains('@') {
            if payee_address.is_none() {
                payee_address = Some(line.to_string());
            }
            continue;
        }

        let lower = line.to_lowercase();
        if amount.is_none() && (lower.contains("amount") || lower.contains("rs")) {
            if let Some(numeric) = first_numeric_run(line) {
                amount = Some(numeric);
                continue;
            }
        }

        if payee_name.is_none()
            && line.len() > 3
            && !line.chars().any(|c| c.is_ascii_digit())
        {
            payee_name = Some(line.to_string());
        }
    }

    let payee_address = payee_address?;

    Some(PaymentIntent {
        payee_address,
        payee_name: payee_name.unwrap_or_else(|| UNKNOWN_MERCHANT.to_string()),
        amount,
        transaction_note: None,
        merchant_code: None,
        transaction_ref: None,
        raw_payload: raw.to_string(),
    })
}

/// Extracts the first integer-or-decimal digit run from a line, e.g.
/// `"Amount: Rs 20.50"` yields `"20.50"`. A trailing dot is not part of the
/// run.
fn first_numeric_run(line: &str) -> Option<String> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let rest = &line[start..];

    let mut end = 0;
    let mut seen_dot = false;
    for (idx, c) in rest.char_indices() {
        if c.is_ascii_digit() {
            end = idx + 1;
        } else if c == '.' && !seen_dot && idx == end {
            seen_dot = true;
        } else {
            break;
        }
    }

    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sticker_style_payload() {
        let intent = parse("shop@paytm\nTea Shop\nAmount: Rs 20").unwrap();
        assert_eq!(intent.payee_address, "shop@paytm");
        assert_eq!(intent.payee_name, "Tea Shop");
        assert_eq!(intent.amount.as_deref(), Some("20"));
    }

    #[test]
    fn decimal_amounts_are_extracted() {
        let intent = parse("shop@ybl\nRs 150.50").unwrap();
        assert_eq!(intent.amount.as_deref(), Some("150.50"));
    }

    #[test]
    fn first_address_line_wins() {
        let intent = parse("one@paytm\ntwo@phonepe").unwrap();
        assert_eq!(intent.payee_address, "one@paytm");
    }

    #[test]
    fn name_defaults_to_unknown_merchant() {
        let intent = parse("shop@gpay").unwrap();
        assert_eq!(intent.payee_name, UNKNOWN_MERCHANT);
    }

    #[test]
    fn short_or_numeric_lines_are_not_names() {
        let intent = parse("shop@paytm\nabc\nShop No 4\nGood Tea House").unwrap();
        // "abc" is too short, "Shop No 4" contains a digit
        assert_eq!(intent.payee_name, "Good Tea House");
    }

    #[test]
    fn requires_a_known_provider_handle() {
        assert!(!matches("someone@example.com"));
        assert!(matches("shop@paytm"));
        assert!(matches("SHOP@PayTM"));
    }

    #[test]
    fn numeric_run_extraction() {
        assert_eq!(first_numeric_run("Rs 20"), Some("20".to_string()));
        assert_eq!(first_numeric_run("amount 12.75 only"), Some("12.75".to_string()));
        assert_eq!(first_numeric_run("Rs 20."), Some("20".to_string()));
        assert_eq!(first_numeric_run("no digits"), None);
    }
}
