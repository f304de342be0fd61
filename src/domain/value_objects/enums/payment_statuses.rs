use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "confirmed" => Some(PaymentStatus::Confirmed),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Failed)
    }

    /// Validates whether a state transition is allowed. `completed` is only
    /// reachable through `confirmed`; terminal states have no way out.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (PaymentStatus::Pending, PaymentStatus::Confirmed) => true,
            (PaymentStatus::Pending, PaymentStatus::Failed) => true,
            (PaymentStatus::Confirmed, PaymentStatus::Completed) => true,
            (PaymentStatus::Confirmed, PaymentStatus::Failed) => true,
            _ => false,
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_transitions_are_validated() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Confirmed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(PaymentStatus::Confirmed.can_transition_to(PaymentStatus::Completed));
        assert!(PaymentStatus::Confirmed.can_transition_to(PaymentStatus::Failed));

        // completed is never reachable without passing through confirmed
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Completed));

        // terminal states have no outgoing transitions
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Confirmed));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn payment_status_string_conversion() {
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Confirmed.as_str(), "confirmed");
        assert_eq!(PaymentStatus::Completed.as_str(), "completed");
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");

        assert_eq!(
            PaymentStatus::from_str("pending"),
            Some(PaymentStatus::Pending)
        );
        assert_eq!(
            PaymentStatus::from_str("confirmed"),
            Some(PaymentStatus::Confirmed)
        );
        assert_eq!(PaymentStatus::from_str("invalid"), None);
    }

    #[test]
    fn terminal_states_are_flagged() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(!PaymentStatus::Confirmed.is_terminal());
        assert!(PaymentStatus::Completed.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }
}
