use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::payments::PaymentEntity,
    repositories::payments::PaymentLedgerRepository,
    value_objects::{
        chain::ChainTransaction,
        enums::{payment_statuses::PaymentStatus, payout_statuses::PayoutStatus},
        payments::PaymentDto,
        payouts::{PayoutInitiation, PayoutWebhookModel},
    },
};

/// Upper bound on confirmed payments examined per poll cycle.
const POLL_BATCH_SIZE: i64 = 50;

/// On-chain transaction lookup by hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainGateway: Send + Sync {
    async fn lookup_transaction(
        &self,
        transaction_hash: &str,
    ) -> AnyResult<Option<ChainTransaction>>;
}

/// The external UPI payout provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayoutGateway: Send + Sync {
    async fn initiate_payout(
        &self,
        reference_id: &str,
        merchant_upi_id: &str,
        amount_fiat: &BigDecimal,
    ) -> AnyResult<PayoutInitiation>;

    async fn payout_status(&self, payout_id: &str) -> AnyResult<PayoutStatus>;

    fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> AnyResult<PayoutWebhookModel>;
}

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("payment not found")]
    PaymentNotFound,

    #[error("payment is not confirmed on-chain")]
    NotConfirmed,

    #[error("on-chain verification failed: {0}")]
    ChainVerificationFailed(String),

    #[error("invalid payment state: {0}")]
    InvalidTransition(String),

    #[error("webhook signature verification failed")]
    InvalidSignature,

    #[error("unknown payout id: {0}")]
    UnknownPayout(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PayoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PayoutError::PaymentNotFound => StatusCode::NOT_FOUND,
            PayoutError::NotConfirmed => StatusCode::CONFLICT,
            PayoutError::ChainVerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PayoutError::InvalidTransition(_) => StatusCode::CONFLICT,
            PayoutError::InvalidSignature => StatusCode::UNAUTHORIZED,
            PayoutError::UnknownPayout(_) => StatusCode::NOT_FOUND,
            PayoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type PayoutResult<T> = std::result::Result<T, PayoutError>;

/// Drives the settlement state machine: verifies the on-chain leg, triggers
/// the fiat payout, and reconciles provider callbacks and polls back into
/// ledger state. Webhook and poller both funnel into the same idempotent
/// transition, so their relative ordering does not matter.
pub struct PayoutCoordinatorUseCase<L, C, G>
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    ledger_repository: Arc<L>,
    chain_gateway: Arc<C>,
    payout_gateway: Arc<G>,
    treasury_address: String,
}

impl<L, C, G> PayoutCoordinatorUseCase<L, C, G>
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    pub fn new(
        ledger_repository: Arc<L>,
        chain_gateway: Arc<C>,
        payout_gateway: Arc<G>,
        treasury_address: String,
    ) -> Self {
        Self {
            ledger_repository,
            chain_gateway,
            payout_gateway,
            treasury_address,
        }
    }

    /// Confirms the on-chain leg of a pending payment. Re-submitting the hash
    /// of an already-confirmed payment is a no-op success.
    pub async fn confirm_payment(
        &self,
        payment_id: Uuid,
        transaction_hash: &str,
    ) -> PayoutResult<PaymentDto> {
        let payment = self.load_payment(payment_id).await?;
        let status = parse_status(&payment)?;

        match status {
            PaymentStatus::Pending => {}
            PaymentStatus::Confirmed | PaymentStatus::Completed => {
                if payment.chain_transaction_hash.as_deref() == Some(transaction_hash) {
                    info!(
                        %payment_id,
                        transaction_hash,
                        "payouts: payment already confirmed, no-op"
                    );
                    return Ok(payment.into());
                }
                return Err(PayoutError::InvalidTransition(
                    "payment already confirmed with a different transaction".to_string(),
                ));
            }
            PaymentStatus::Failed => {
                return Err(PayoutError::InvalidTransition(
                    "payment already failed".to_string(),
                ));
            }
        }

        let lookup = self
            .chain_gateway
            .lookup_transaction(transaction_hash)
            .await
            .map_err(|err| {
                error!(
                    %payment_id,
                    transaction_hash,
                    error = ?err,
                    "payouts: on-chain lookup failed"
                );
                PayoutError::Internal(err)
            })?;

        // the guard: the transaction must exist, have succeeded, and pay the
        // treasury address we expect the user's wallet to have targeted
        let rejection = match &lookup {
            None => Some("on-chain transaction not found".to_string()),
            Some(tx) if !tx.succeeded => {
                Some("on-chain transaction did not succeed".to_string())
            }
            Some(tx) if !tx.to_address.eq_ignore_ascii_case(&self.treasury_address) => {
                Some("on-chain transaction does not pay the treasury address".to_string())
            }
            Some(_) => None,
        };

        if let Some(reason) = rejection {
            warn!(
                %payment_id,
                transaction_hash,
                reason,
                "payouts: confirmation rejected"
            );
            self.ledger_repository
                .mark_failed(payment_id, &reason)
                .await
                .map_err(|err| {
                    error!(%payment_id, db_error = ?err, "payouts: failed to mark payment failed");
                    PayoutError::Internal(err)
                })?;
            return Err(PayoutError::ChainVerificationFailed(reason));
        }

        let confirmed = self
            .ledger_repository
            .mark_confirmed(payment_id, transaction_hash)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payouts: failed to mark payment confirmed");
                PayoutError::Internal(err)
            })?;

        info!(%payment_id, transaction_hash, "payouts: payment confirmed on-chain");
        Ok(confirmed.into())
    }

    /// Initiates the fiat payout for a confirmed payment. The payout id is
    /// persisted whether or not the provider accepts the call, so every
    /// attempt stays trackable for reconciliation; a provider failure lands
    /// the payment in `failed` with the crypto leg already settled, which is
    /// the manual-reconciliation case.
    pub async fn initiate_payout(&self, payment_id: Uuid) -> PayoutResult<PaymentDto> {
        let payment = self.load_payment(payment_id).await?;
        let status = parse_status(&payment)?;

        match status {
            PaymentStatus::Confirmed => {}
            PaymentStatus::Completed => return Ok(payment.into()),
            _ => return Err(PayoutError::NotConfirmed),
        }

        if payment.payout_id.is_some() {
            info!(%payment_id, payout_id = ?payment.payout_id, "payouts: payout already initiated, no-op");
            return Ok(payment.into());
        }

        let reference_id = format!("po_{}", Uuid::new_v4().simple());

        match self
            .payout_gateway
            .initiate_payout(&reference_id, &payment.merchant_upi_id, &payment.amount_fiat)
            .await
        {
            Ok(initiation) => {
                let updated = self
                    .ledger_repository
                    .set_payout_id(payment_id, &initiation.payout_id)
                    .await
                    .map_err(|err| {
                        error!(%payment_id, db_error = ?err, "payouts: failed to persist payout id");
                        PayoutError::Internal(err)
                    })?;

                if initiation.accepted {
                    info!(
                        %payment_id,
                        payout_id = %initiation.payout_id,
                        "payouts: payout initiated"
                    );
                    Ok(updated.into())
                } else {
                    let reason = initiation
                        .failure_reason
                        .unwrap_or_else(|| "payout provider rejected the payout".to_string());
                    error!(
                        %payment_id,
                        payout_id = %initiation.payout_id,
                        reason,
                        "payouts: provider rejected payout after on-chain settlement, manual reconciliation required"
                    );
                    let failed = self
                        .ledger_repository
                        .mark_failed(payment_id, &reason)
                        .await
                        .map_err(PayoutError::Internal)?;
                    Ok(failed.into())
                }
            }
            Err(err) => {
                error!(
                    %payment_id,
                    reference_id,
                    error = ?err,
                    "payouts: payout initiation call failed after on-chain settlement, manual reconciliation required"
                );
                self.ledger_repository
                    .set_payout_id(payment_id, &reference_id)
                    .await
                    .map_err(PayoutError::Internal)?;
                let failed = self
                    .ledger_repository
                    .mark_failed(payment_id, &format!("payout initiation failed: {err}"))
                    .await
                    .map_err(PayoutError::Internal)?;
                Ok(failed.into())
            }
        }
    }

    /// Applies a provider webhook. The signature is verified over the raw
    /// body before anything is trusted; an unverifiable payload is discarded
    /// without touching ledger state.
    pub async fn handle_webhook(&self, payload: &[u8], signature: &str) -> PayoutResult<()> {
        let webhook = self
            .payout_gateway
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "payouts: discarding webhook with invalid signature");
                PayoutError::InvalidSignature
            })?;

        let Some(status) = PayoutStatus::from_provider_str(&webhook.status) else {
            warn!(
                payout_id = %webhook.payout_id,
                status = %webhook.status,
                "payouts: webhook carried unknown status, ignoring"
            );
            return Ok(());
        };

        info!(
            payout_id = %webhook.payout_id,
            status = %status,
            transaction_id = ?webhook.transaction_id,
            "payouts: verified webhook received"
        );

        self.apply_payout_status(&webhook.payout_id, status).await
    }

    /// One poll cycle: asks the provider for the status of every confirmed
    /// payment that has a payout in flight. Runs sequentially, so cycles
    /// never overlap; a cycle racing a webhook is harmless because both end
    /// in `apply_payout_status`.
    pub async fn poll_pending_payouts(&self) -> AnyResult<()> {
        let confirmed = self
            .ledger_repository
            .list_by_status(PaymentStatus::Confirmed.as_str(), POLL_BATCH_SIZE)
            .await?;

        for payment in confirmed {
            let Some(payout_id) = payment.payout_id.clone() else {
                continue;
            };

            match self.payout_gateway.payout_status(&payout_id).await {
                Ok(status) if status.is_resolved() => {
                    if let Err(err) = self.apply_payout_status(&payout_id, status).await {
                        error!(
                            payment_id = %payment.id,
                            %payout_id,
                            error = %err,
                            "payouts: failed to apply polled payout status"
                        );
                    }
                }
                Ok(status) => {
                    debug!(payment_id = %payment.id, %payout_id, %status, "payouts: payout still unresolved");
                }
                Err(err) => {
                    warn!(
                        payment_id = %payment.id,
                        %payout_id,
                        error = %err,
                        "payouts: status poll failed, will retry next cycle"
                    );
                }
            }
        }

        Ok(())
    }

    /// The single convergence point for webhook and poller. Terminal
    /// payments are left untouched, which is what makes re-delivery and
    /// webhook/poll races safe.
    async fn apply_payout_status(
        &self,
        payout_id: &str,
        status: PayoutStatus,
    ) -> PayoutResult<()> {
        let payment = self
            .ledger_repository
            .find_by_payout_id(payout_id)
            .await
            .map_err(|err| {
                error!(payout_id, db_error = ?err, "payouts: failed to load payment by payout id");
                PayoutError::Internal(err)
            })?
            .ok_or_else(|| PayoutError::UnknownPayout(payout_id.to_string()))?;

        let current = parse_status(&payment)?;

        if current.is_terminal() {
            debug!(payment_id = %payment.id, payout_id, "payouts: payment already terminal, no-op");
            return Ok(());
        }

        match (current, status) {
            (PaymentStatus::Confirmed, PayoutStatus::Success) => {
                self.ledger_repository
                    .mark_completed(payment.id, payout_id)
                    .await
                    .map_err(PayoutError::Internal)?;
                info!(payment_id = %payment.id, payout_id, "payouts: payment completed");
                Ok(())
            }
            (PaymentStatus::Confirmed, PayoutStatus::Failed) => {
                error!(
                    payment_id = %payment.id,
                    payout_id,
                    "payouts: payout failed after on-chain settlement, manual reconciliation required"
                );
                self.ledger_repository
                    .mark_failed(payment.id, "payout provider reported failure")
                    .await
                    .map_err(PayoutError::Internal)?;
                Ok(())
            }
            (PaymentStatus::Pending, _) => {
                warn!(
                    payment_id = %payment.id,
                    payout_id,
                    "payouts: payout status for unconfirmed payment, ignoring"
                );
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn load_payment(&self, payment_id: Uuid) -> PayoutResult<PaymentEntity> {
        self.ledger_repository
            .find_by_id(payment_id)
            .await
            .map_err(|err| {
                error!(%payment_id, db_error = ?err, "payouts: failed to load payment");
                PayoutError::Internal(err)
            })?
            .ok_or(PayoutError::PaymentNotFound)
    }
}

fn parse_status(payment: &PaymentEntity) -> PayoutResult<PaymentStatus> {
    PaymentStatus::from_str(&payment.status).ok_or_else(|| {
        PayoutError::Internal(anyhow::anyhow!(
            "payment {} has unknown status {:?}",
            payment.id,
            payment.status
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;
    use crate::domain::repositories::payments::MockPaymentLedgerRepository;
    use crate::domain::upi;

    const TREASURY: &str = "0xTreasury";

    fn payment(status: PaymentStatus) -> PaymentEntity {
        PaymentEntity {
            id: Uuid::new_v4(),
            merchant_id: "m-1".to_string(),
            wallet_address: "0xwallet".to_string(),
            merchant_upi_id: "shop@upi".to_string(),
            amount_fiat: BigDecimal::from_str("150.50").unwrap(),
            stablecoin_amount: BigDecimal::from_str("2").unwrap(),
            exchange_rate: BigDecimal::from_str("75.25").unwrap(),
            status: status.to_string(),
            chain_transaction_hash: None,
            payout_id: None,
            failure_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn coordinator(
        ledger: MockPaymentLedgerRepository,
        chain: MockChainGateway,
        payout: MockPayoutGateway,
    ) -> PayoutCoordinatorUseCase<MockPaymentLedgerRepository, MockChainGateway, MockPayoutGateway>
    {
        PayoutCoordinatorUseCase::new(
            Arc::new(ledger),
            Arc::new(chain),
            Arc::new(payout),
            TREASURY.to_string(),
        )
    }

    #[tokio::test]
    async fn confirm_transitions_pending_to_confirmed() {
        let pending = payment(PaymentStatus::Pending);
        let payment_id = pending.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        let found = pending.clone();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        ledger
            .expect_mark_confirmed()
            .withf(move |id, hash| *id == payment_id && hash == "0xabc")
            .times(1)
            .returning(|id, hash| {
                let mut confirmed = payment(PaymentStatus::Confirmed);
                confirmed.id = id;
                confirmed.chain_transaction_hash = Some(hash.to_string());
                Ok(confirmed)
            });

        let mut chain = MockChainGateway::new();
        chain.expect_lookup_transaction().returning(|hash| {
            Ok(Some(ChainTransaction {
                hash: hash.to_string(),
                to_address: TREASURY.to_string(),
                succeeded: true,
            }))
        });

        let usecase = coordinator(ledger, chain, MockPayoutGateway::new());
        let dto = usecase.confirm_payment(payment_id, "0xabc").await.unwrap();
        assert_eq!(dto.status, "confirmed");
        assert_eq!(dto.chain_transaction_hash.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn confirm_rejects_transaction_to_wrong_address() {
        let pending = payment(PaymentStatus::Pending);
        let payment_id = pending.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));
        ledger
            .expect_mark_failed()
            .times(1)
            .returning(|id, reason| {
                let mut failed = payment(PaymentStatus::Failed);
                failed.id = id;
                failed.failure_reason = Some(reason.to_string());
                Ok(failed)
            });

        let mut chain = MockChainGateway::new();
        chain.expect_lookup_transaction().returning(|hash| {
            Ok(Some(ChainTransaction {
                hash: hash.to_string(),
                to_address: "0xSomeoneElse".to_string(),
                succeeded: true,
            }))
        });

        let usecase = coordinator(ledger, chain, MockPayoutGateway::new());
        let result = usecase.confirm_payment(payment_id, "0xabc").await;
        assert!(matches!(
            result,
            Err(PayoutError::ChainVerificationFailed(_))
        ));
    }

    #[tokio::test]
    async fn confirm_rejects_missing_and_failed_transactions() {
        for lookup_result in [None, Some(false)] {
            let pending = payment(PaymentStatus::Pending);
            let payment_id = pending.id;

            let mut ledger = MockPaymentLedgerRepository::new();
            ledger
                .expect_find_by_id()
                .returning(move |_| Ok(Some(pending.clone())));
            ledger
                .expect_mark_failed()
                .times(1)
                .returning(|id, reason| {
                    let mut failed = payment(PaymentStatus::Failed);
                    failed.id = id;
                    failed.failure_reason = Some(reason.to_string());
                    Ok(failed)
                });

            let mut chain = MockChainGateway::new();
            chain.expect_lookup_transaction().returning(move |hash| {
                Ok(lookup_result.map(|succeeded| ChainTransaction {
                    hash: hash.to_string(),
                    to_address: TREASURY.to_string(),
                    succeeded,
                }))
            });

            let usecase = coordinator(ledger, chain, MockPayoutGateway::new());
            let result = usecase.confirm_payment(payment_id, "0xabc").await;
            assert!(matches!(
                result,
                Err(PayoutError::ChainVerificationFailed(_))
            ));
        }
    }

    #[tokio::test]
    async fn reconfirming_with_same_hash_is_a_noop() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.chain_transaction_hash = Some("0xabc".to_string());
        let payment_id = confirmed.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(confirmed.clone())));

        // no chain lookup, no mark_confirmed: the mocks would panic on any call
        let usecase = coordinator(ledger, MockChainGateway::new(), MockPayoutGateway::new());
        let dto = usecase.confirm_payment(payment_id, "0xabc").await.unwrap();
        assert_eq!(dto.status, "confirmed");
    }

    #[tokio::test]
    async fn reconfirming_with_different_hash_is_rejected() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.chain_transaction_hash = Some("0xabc".to_string());
        let payment_id = confirmed.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(confirmed.clone())));

        let usecase = coordinator(ledger, MockChainGateway::new(), MockPayoutGateway::new());
        let result = usecase.confirm_payment(payment_id, "0xother").await;
        assert!(matches!(result, Err(PayoutError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn initiate_payout_requires_confirmed_state() {
        let pending = payment(PaymentStatus::Pending);
        let payment_id = pending.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));

        let usecase = coordinator(ledger, MockChainGateway::new(), MockPayoutGateway::new());
        let result = usecase.initiate_payout(payment_id).await;
        assert!(matches!(result, Err(PayoutError::NotConfirmed)));
    }

    #[tokio::test]
    async fn initiate_payout_is_idempotent_once_a_payout_exists() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.payout_id = Some("pout_1".to_string());
        let payment_id = confirmed.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(confirmed.clone())));

        // the payout gateway mock would panic if called again
        let usecase = coordinator(ledger, MockChainGateway::new(), MockPayoutGateway::new());
        let dto = usecase.initiate_payout(payment_id).await.unwrap();
        assert_eq!(dto.payout_id.as_deref(), Some("pout_1"));
    }

    #[tokio::test]
    async fn initiate_payout_records_provider_rejection_as_failure() {
        let confirmed = payment(PaymentStatus::Confirmed);
        let payment_id = confirmed.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(confirmed.clone())));
        ledger
            .expect_set_payout_id()
            .withf(|_, payout_id| payout_id == "pout_rejected")
            .times(1)
            .returning(|id, payout_id| {
                let mut updated = payment(PaymentStatus::Confirmed);
                updated.id = id;
                updated.payout_id = Some(payout_id.to_string());
                Ok(updated)
            });
        ledger
            .expect_mark_failed()
            .times(1)
            .returning(|id, reason| {
                let mut failed = payment(PaymentStatus::Failed);
                failed.id = id;
                failed.failure_reason = Some(reason.to_string());
                Ok(failed)
            });

        let mut payout = MockPayoutGateway::new();
        payout.expect_initiate_payout().returning(|_, _, _| {
            Ok(PayoutInitiation {
                payout_id: "pout_rejected".to_string(),
                accepted: false,
                failure_reason: Some("insufficient provider balance".to_string()),
            })
        });

        let usecase = coordinator(ledger, MockChainGateway::new(), payout);
        let dto = usecase.initiate_payout(payment_id).await.unwrap();
        assert_eq!(dto.status, "failed");
        assert!(dto.failure_reason.is_some());
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_discarded() {
        let mut payout = MockPayoutGateway::new();
        payout
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("invalid webhook signature")));

        // ledger mock with no expectations: any state change would panic
        let usecase = coordinator(
            MockPaymentLedgerRepository::new(),
            MockChainGateway::new(),
            payout,
        );
        let result = usecase.handle_webhook(b"{}", "deadbeef").await;
        assert!(matches!(result, Err(PayoutError::InvalidSignature)));
    }

    #[tokio::test]
    async fn successful_webhook_completes_the_payment() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.payout_id = Some("pout_1".to_string());
        let payment_id = confirmed.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_payout_id()
            .withf(|payout_id| payout_id == "pout_1")
            .returning(move |_| Ok(Some(confirmed.clone())));
        ledger
            .expect_mark_completed()
            .withf(move |id, payout_id| *id == payment_id && payout_id == "pout_1")
            .times(1)
            .returning(|id, payout_id| {
                let mut completed = payment(PaymentStatus::Completed);
                completed.id = id;
                completed.payout_id = Some(payout_id.to_string());
                Ok(completed)
            });

        let mut payout = MockPayoutGateway::new();
        payout.expect_verify_webhook_signature().returning(|_, _| {
            Ok(PayoutWebhookModel {
                payout_id: "pout_1".to_string(),
                status: "success".to_string(),
                transaction_id: Some("utr-42".to_string()),
            })
        });

        let usecase = coordinator(ledger, MockChainGateway::new(), payout);
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn failed_webhook_records_partial_failure() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.payout_id = Some("pout_1".to_string());

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_payout_id()
            .returning(move |_| Ok(Some(confirmed.clone())));
        ledger
            .expect_mark_failed()
            .withf(|_, reason| reason.contains("payout provider"))
            .times(1)
            .returning(|id, reason| {
                let mut failed = payment(PaymentStatus::Failed);
                failed.id = id;
                failed.failure_reason = Some(reason.to_string());
                Ok(failed)
            });

        let mut payout = MockPayoutGateway::new();
        payout.expect_verify_webhook_signature().returning(|_, _| {
            Ok(PayoutWebhookModel {
                payout_id: "pout_1".to_string(),
                status: "failed".to_string(),
                transaction_id: None,
            })
        });

        let usecase = coordinator(ledger, MockChainGateway::new(), payout);
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn redelivered_webhook_for_completed_payment_is_a_noop() {
        let mut completed = payment(PaymentStatus::Completed);
        completed.payout_id = Some("pout_1".to_string());

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_find_by_payout_id()
            .returning(move |_| Ok(Some(completed.clone())));
        // no mark_completed / mark_failed expectations: any call panics

        let mut payout = MockPayoutGateway::new();
        payout.expect_verify_webhook_signature().returning(|_, _| {
            Ok(PayoutWebhookModel {
                payout_id: "pout_1".to_string(),
                status: "success".to_string(),
                transaction_id: None,
            })
        });

        let usecase = coordinator(ledger, MockChainGateway::new(), payout);
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn poll_applies_resolved_statuses_and_skips_unresolved() {
        let mut confirmed = payment(PaymentStatus::Confirmed);
        confirmed.payout_id = Some("pout_1".to_string());
        let listed = confirmed.clone();

        let mut ledger = MockPaymentLedgerRepository::new();
        ledger
            .expect_list_by_status()
            .withf(|status, _| status == "confirmed")
            .returning(move |_, _| Ok(vec![listed.clone()]));
        ledger
            .expect_find_by_payout_id()
            .returning(move |_| Ok(Some(confirmed.clone())));
        ledger
            .expect_mark_completed()
            .times(1)
            .returning(|id, payout_id| {
                let mut completed = payment(PaymentStatus::Completed);
                completed.id = id;
                completed.payout_id = Some(payout_id.to_string());
                Ok(completed)
            });

        let mut payout = MockPayoutGateway::new();
        payout
            .expect_payout_status()
            .returning(|_| Ok(PayoutStatus::Success));

        let usecase = coordinator(ledger, MockChainGateway::new(), payout);
        usecase.poll_pending_payouts().await.unwrap();
    }

    /// End-to-end walk of the happy path: scan, confirm against a matching
    /// on-chain transfer, then a signed success webhook.
    #[tokio::test]
    async fn scan_confirm_webhook_flow_reaches_completed() {
        let intent = upi::parse("upi://pay?pa=shop@upi&pn=Shop&am=150.50&tn=Lunch").unwrap();
        assert_eq!(intent.payee_address, "shop@upi");
        assert_eq!(intent.payee_name, "Shop");
        assert_eq!(intent.amount.as_deref(), Some("150.50"));
        assert_eq!(intent.transaction_note.as_deref(), Some("Lunch"));

        let pending = payment(PaymentStatus::Pending);
        let payment_id = pending.id;

        let mut ledger = MockPaymentLedgerRepository::new();
        let found = pending.clone();
        ledger
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        ledger.expect_mark_confirmed().times(1).returning(|id, hash| {
            let mut confirmed = payment(PaymentStatus::Confirmed);
            confirmed.id = id;
            confirmed.chain_transaction_hash = Some(hash.to_string());
            confirmed.payout_id = Some("pout_1".to_string());
            Ok(confirmed)
        });
        ledger.expect_find_by_payout_id().returning(move |_| {
            let mut confirmed = payment(PaymentStatus::Confirmed);
            confirmed.id = payment_id;
            confirmed.payout_id = Some("pout_1".to_string());
            Ok(Some(confirmed))
        });
        ledger.expect_mark_completed().times(1).returning(|id, payout_id| {
            let mut completed = payment(PaymentStatus::Completed);
            completed.id = id;
            completed.payout_id = Some(payout_id.to_string());
            Ok(completed)
        });

        let mut chain = MockChainGateway::new();
        chain.expect_lookup_transaction().returning(|hash| {
            Ok(Some(ChainTransaction {
                hash: hash.to_string(),
                to_address: TREASURY.to_string(),
                succeeded: true,
            }))
        });

        let mut payout = MockPayoutGateway::new();
        payout.expect_verify_webhook_signature().returning(|_, _| {
            Ok(PayoutWebhookModel {
                payout_id: "pout_1".to_string(),
                status: "success".to_string(),
                transaction_id: Some("utr-1".to_string()),
            })
        });

        let usecase = coordinator(ledger, chain, payout);
        let confirmed = usecase.confirm_payment(payment_id, "0xabc").await.unwrap();
        assert_eq!(confirmed.status, "confirmed");

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }
}
