pub mod chain;
pub mod enums;
pub mod payment_intent;
pub mod payments;
pub mod payouts;
