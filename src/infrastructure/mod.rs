pub mod axum_http;
pub mod chain;
pub mod payout;
pub mod postgres;
pub mod rates;
