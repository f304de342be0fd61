use std::sync::Arc;

use async_trait::async_trait;
use bigdecimal::{BigDecimal, RoundingMode};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{
    entities::payments::InsertPaymentEntity,
    repositories::payments::PaymentLedgerRepository,
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        payments::{CreatePaymentModel, PaymentDto},
    },
};

/// Scale used for the computed stablecoin amount.
const STABLECOIN_SCALE: i64 = 8;

/// Supplies the current asset/fiat exchange rate. Implementations never fail:
/// staleness is absorbed internally so a payment can always be quoted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateGateway: Send + Sync {
    async fn get_rate(&self, from_currency: &str, to_currency: &str) -> BigDecimal;
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment not found")]
    NotFound,

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PaymentError::NotFound => StatusCode::NOT_FOUND,
            PaymentError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            PaymentError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PaymentResult<T> = std::result::Result<T, PaymentError>;

/// Creates and reads ledger entries. The exchange rate is snapshotted at
/// creation time and never recomputed for an existing payment.
pub struct PaymentUseCase<L, R>
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    R: RateGateway + Send + Sync + 'static,
{
    ledger_repository: Arc<L>,
    rate_gateway: Arc<R>,
    asset_currency: String,
    fiat_currency: String,
}

impl<L, R> PaymentUseCase<L, R>
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    R: RateGateway + Send + Sync + 'static,
{
    pub fn new(
        ledger_repository: Arc<L>,
        rate_gateway: Arc<R>,
        asset_currency: String,
        fiat_currency: String,
    ) -> Self {
        Self {
            ledger_repository,
            rate_gateway,
            asset_currency,
            fiat_currency,
        }
    }

    pub async fn create_payment(&self, model: CreatePaymentModel) -> PaymentResult<PaymentDto> {
        if model.amount_fiat <= BigDecimal::from(0) {
            return Err(PaymentError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }

        let exchange_rate = self
            .rate_gateway
            .get_rate(&self.asset_currency, &self.fiat_currency)
            .await;
        if exchange_rate <= BigDecimal::from(0) {
            return Err(PaymentError::Internal(anyhow::anyhow!(
                "non-positive exchange rate {} for {}/{}",
                exchange_rate,
                self.asset_currency,
                self.fiat_currency
            )));
        }

        let stablecoin_amount = (&model.amount_fiat / &exchange_rate)
            .with_scale_round(STABLECOIN_SCALE, RoundingMode::HalfUp);

        info!(
            merchant_upi_id = %model.merchant_upi_id,
            amount_fiat = %model.amount_fiat,
            exchange_rate = %exchange_rate,
            stablecoin_amount = %stablecoin_amount,
            "payments: creating pending payment with snapshotted rate"
        );

        let payment = self
            .ledger_repository
            .create(InsertPaymentEntity {
                merchant_id: model.merchant_id,
                wallet_address: model.wallet_address,
                merchant_upi_id: model.merchant_upi_id,
                amount_fiat: model.amount_fiat,
                stablecoin_amount,
                exchange_rate,
                status: PaymentStatus::Pending.to_string(),
            })
            .await
            .map_err(|err| {
                error!(db_error = ?err, "payments: failed to persist payment");
                PaymentError::Internal(err)
            })?;

        info!(payment_id = %payment.id, "payments: payment created");
        Ok(payment.into())
    }

    pub async fn get_payment(&self, payment_id: Uuid) -> PaymentResult<PaymentDto> {
        let payment = self
            .ledger_repository
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payments: failed to load payment");
                PaymentError::Internal(err)
            })?
            .ok_or(PaymentError::NotFound)?;

        Ok(payment.into())
    }
}
