use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::payments;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payments)]
pub struct PaymentEntity {
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payments)]
pub struct InsertPaymentEntity {
    pub merchant_id: String,
    pub wallet_address: String,
    pub merchant_upi_id: String,
    pub amount_fiat: BigDecimal,
    pub stablecoin_amount: BigDecimal,
    pub exchange_rate: BigDecimal,
    pub status: String,
}
