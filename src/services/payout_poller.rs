use std::{sync::Arc, time::Duration};

use anyhow::Result;
use tracing::error;

use crate::{
    application::usecases::payouts::{ChainGateway, PayoutCoordinatorUseCase, PayoutGateway},
    domain::repositories::payments::PaymentLedgerRepository,
};

/// Reconciliation loop for payouts whose webhook never arrived. Cycles run
/// sequentially with a fixed sleep, so no two polls ever overlap.
pub async fn run_poller_loop<L, C, G>(
    coordinator: Arc<PayoutCoordinatorUseCase<L, C, G>>,
    interval: Duration,
) -> Result<()>
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    loop {
        if let Err(e) = coordinator.poll_pending_payouts().await {
            error!("Error while polling pending payouts: {}", e);
        }

        tokio::time::sleep(interval).await;
    }
}
