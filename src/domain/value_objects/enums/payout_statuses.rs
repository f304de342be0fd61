use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Status of the fiat payout leg as reported by the payout provider, either
/// through the webhook or the status poll.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Success => "success",
            PayoutStatus::Failed => "failed",
        }
    }

    /// Maps the provider's wire vocabulary onto our own. Providers disagree
    /// on terminal-success naming, so a few synonyms are accepted.
    pub fn from_provider_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" | "queued" => Some(PayoutStatus::Pending),
            "processing" | "initiated" => Some(PayoutStatus::Processing),
            "success" | "processed" | "completed" => Some(PayoutStatus::Success),
            "failed" | "reversed" | "rejected" => Some(PayoutStatus::Failed),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, PayoutStatus::Success | PayoutStatus::Failed)
    }
}

impl Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_vocabulary_is_normalized() {
        assert_eq!(
            PayoutStatus::from_provider_str("processed"),
            Some(PayoutStatus::Success)
        );
        assert_eq!(
            PayoutStatus::from_provider_str("SUCCESS"),
            Some(PayoutStatus::Success)
        );
        assert_eq!(
            PayoutStatus::from_provider_str("reversed"),
            Some(PayoutStatus::Failed)
        );
        assert_eq!(
            PayoutStatus::from_provider_str("queued"),
            Some(PayoutStatus::Pending)
        );
        assert_eq!(PayoutStatus::from_provider_str("garbage"), None);
    }

    #[test]
    fn resolved_statuses_are_flagged() {
        assert!(PayoutStatus::Success.is_resolved());
        assert!(PayoutStatus::Failed.is_resolved());
        assert!(!PayoutStatus::Pending.is_resolved());
        assert!(!PayoutStatus::Processing.is_resolved());
    }
}
