use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::payments::PaymentEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentModel {
    pub merchant_id: String,
    pub wallet_address: String,
    pub merchant_upi_id: String,
    pub amount_fiat: BigDecimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmPaymentModel {
    pub transaction_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentDto {
    pub id: Uuid,
    pub merchant_id: String,
    pub wallet_address: String,
    pub merchant_upi_id: String,
    pub amount_fiat: BigDecimal,
    pub stablecoin_amount: BigDecimal,
    pub exchange_rate: BigDecimal,
    pub status: String,
    pub chain_transaction_hash: Option<String>,
    pub payout_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for PaymentDto {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            merchant_id: entity.merchant_id,
            wallet_address: entity.wallet_address,
            merchant_upi_id: entity.merchant_upi_id,
            amount_fiat: entity.amount_fiat,
            stablecoin_amount: entity.stablecoin_amount,
            exchange_rate: entity.exchange_rate,
            status: entity.status,
            chain_transaction_hash: entity.chain_transaction_hash,
            payout_id: entity.payout_id,
            failure_reason: entity.failure_reason,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
