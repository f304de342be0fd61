pub mod payments;
pub mod payouts;
pub mod qr_scan;
