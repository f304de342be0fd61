pub mod payment_statuses;
pub mod payout_statuses;
