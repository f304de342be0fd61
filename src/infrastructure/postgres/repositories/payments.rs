use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::payments::{InsertPaymentEntity, PaymentEntity},
        repositories::payments::PaymentLedgerRepository,
        value_objects::enums::payment_statuses::PaymentStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::payments},
};

pub struct PaymentLedgerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentLedgerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }

    /// Loads a payment after a guarded update matched zero rows, so the
    /// caller gets a precise error instead of a bare "not found".
    fn reload(&self, payment_id: Uuid) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .find(payment_id)
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        match payment {
            Some(payment) => anyhow::bail!(
                "payment {} is in status {:?} and cannot be updated",
                payment_id,
                payment.status
            ),
            None => anyhow::bail!("payment {} not found", payment_id),
        }
    }
}

#[async_trait]
impl PaymentLedgerRepository for PaymentLedgerPostgres {
    async fn create(&self, insert_payment_entity: InsertPaymentEntity) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = insert_into(payments::table)
            .values(&insert_payment_entity)
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)?;

        Ok(payment)
    }

    async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .find(payment_id)
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn find_by_payout_id(&self, payout_id: &str) -> Result<Option<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = payments::table
            .filter(payments::payout_id.eq(payout_id))
            .select(PaymentEntity::as_select())
            .first::<PaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn list_by_status(&self, status: &str, limit: i64) -> Result<Vec<PaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = payments::table
            .filter(payments::status.eq(status))
            .order(payments::created_at.asc())
            .limit(limit)
            .select(PaymentEntity::as_select())
            .load::<PaymentEntity>(&mut conn)?;

        Ok(results)
    }

    async fn mark_confirmed(
        &self,
        payment_id: Uuid,
        chain_transaction_hash: &str,
    ) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // status filter keeps a terminal row from being resurrected by a
        // late or repeated confirmation
        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::status.eq(PaymentStatus::Pending.to_string()))
            .set((
                payments::status.eq(PaymentStatus::Confirmed.to_string()),
                payments::chain_transaction_hash.eq(Some(chain_transaction_hash)),
                payments::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        match updated {
            Some(payment) => Ok(payment),
            None => self.reload(payment_id),
        }
    }

    async fn set_payout_id(&self, payment_id: Uuid, payout_id: &str) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::payout_id.is_null())
            .set((
                payments::payout_id.eq(Some(payout_id)),
                payments::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        match updated {
            Some(payment) => Ok(payment),
            None => self.reload(payment_id),
        }
    }

    async fn mark_completed(&self, payment_id: Uuid, payout_id: &str) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(payments::status.eq(PaymentStatus::Confirmed.to_string()))
            .filter(payments::payout_id.eq(payout_id))
            .set((
                payments::status.eq(PaymentStatus::Completed.to_string()),
                payments::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        match updated {
            Some(payment) => Ok(payment),
            None => self.reload(payment_id),
        }
    }

    async fn mark_failed(&self, payment_id: Uuid, failure_reason: &str) -> Result<PaymentEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(payments::table)
            .filter(payments::id.eq(payment_id))
            .filter(
                payments::status.ne_all(vec![
                    PaymentStatus::Completed.to_string(),
                    PaymentStatus::Failed.to_string(),
                ]),
            )
            .set((
                payments::status.eq(PaymentStatus::Failed.to_string()),
                payments::failure_reason.eq(Some(failure_reason)),
                payments::updated_at.eq(Utc::now()),
            ))
            .returning(PaymentEntity::as_returning())
            .get_result::<PaymentEntity>(&mut conn)
            .optional()?;

        match updated {
            Some(payment) => Ok(payment),
            None => self.reload(payment_id),
        }
    }
}
