use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::payments::{InsertPaymentEntity, PaymentEntity};

/// Owner of the persisted `Payment` lifecycle. Rows are append-only: status
/// mutations go through the `mark_*` methods and nothing is ever deleted.
#[automock]
#[async_trait]
pub trait PaymentLedgerRepository {
    async fn create(&self, insert_payment_entity: InsertPaymentEntity) -> Result<PaymentEntity>;

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>>;

    async fn find_by_payout_id(&self, payout_id: &str) -> Result<Option<PaymentEntity>>;

    async fn list_by_status(&self, status: &str, limit: i64) -> Result<Vec<PaymentEntity>>;

    async fn mark_confirmed(
        &self,
        payment_id: Uuid,
        chain_transaction_hash: &str,
    ) -> Result<PaymentEntity>;

    async fn set_payout_id(&self, payment_id: Uuid, payout_id: &str) -> Result<PaymentEntity>;

    async fn mark_completed(&self, payment_id: Uuid, payout_id: &str) -> Result<PaymentEntity>;

    async fn mark_failed(&self, payment_id: Uuid, failure_reason: &str) -> Result<PaymentEntity>;
}
