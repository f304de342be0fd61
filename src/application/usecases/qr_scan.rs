use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{
    upi::{self, validator},
    value_objects::payment_intent::PaymentIntent,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("not a valid UPI QR code")]
    NotUpi,
}

impl ScanError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            ScanError::NotUpi => axum::http::StatusCode::BAD_REQUEST,
        }
    }
}

/// Turns a raw decoded QR string into a validated payment intent.
pub struct QrScanUseCase;

impl QrScanUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn scan(&self, raw: &str) -> Result<PaymentIntent, ScanError> {
        let dialect = upi::classify(raw);
        info!(dialect = ?dialect, payload_len = raw.len(), "qr_scan: classified payload");

        let intent = upi::parse(raw).ok_or_else(|| {
            warn!(dialect = ?dialect, "qr_scan: payload rejected");
            ScanError::NotUpi
        })?;

        validator::validate(intent).map_err(|err| {
            warn!(error = %err, "qr_scan: intent failed validation");
            ScanError::NotUpi
        })
    }
}
