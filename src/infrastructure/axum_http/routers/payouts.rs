use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    application::usecases::payouts::{ChainGateway, PayoutCoordinatorUseCase, PayoutGateway},
    domain::{
        repositories::payments::PaymentLedgerRepository,
        value_objects::payments::ConfirmPaymentModel,
    },
    infrastructure::axum_http::error_responses::error_response,
};

pub const SIGNATURE_HEADER: &str = "x-payout-signature";

pub fn routes<L, C, G>(coordinator: Arc<PayoutCoordinatorUseCase<L, C, G>>) -> Router
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/payments/:payment_id/confirm", post(confirm_payment))
        .route("/payouts/webhook", post(payout_webhook))
        .with_state(coordinator)
}

/// Confirms the on-chain transfer and, when the guard passes, immediately
/// kicks off the fiat payout. The response reflects the payment after both
/// steps.
pub async fn confirm_payment<L, C, G>(
    State(coordinator): State<Arc<PayoutCoordinatorUseCase<L, C, G>>>,
    Path(payment_id): Path<Uuid>,
    Json(model): Json<ConfirmPaymentModel>,
) -> Response
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    if let Err(err) = coordinator
        .confirm_payment(payment_id, &model.transaction_hash)
        .await
    {
        error!(%payment_id, error = %err, "payouts router: confirmation failed");
        return error_response(err.status_code(), err.to_string());
    }

    match coordinator.initiate_payout(payment_id).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(err) => {
            error!(%payment_id, error = %err, "payouts router: payout initiation failed");
            error_response(err.status_code(), err.to_string())
        }
    }
}

/// Provider callback. The body is taken raw so the HMAC is computed over the
/// exact bytes that were signed.
pub async fn payout_webhook<L, C, G>(
    State(coordinator): State<Arc<PayoutCoordinatorUseCase<L, C, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    C: ChainGateway + Send + Sync + 'static,
    G: PayoutGateway + Send + Sync + 'static,
{
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("payouts router: webhook missing signature header");
        return error_response(
            StatusCode::UNAUTHORIZED,
            "missing webhook signature".to_string(),
        );
    };

    match coordinator.handle_webhook(&body, signature).await {
        Ok(()) => (StatusCode::OK, "OK").into_response(),
        Err(err) => {
            warn!(error = %err, "payouts router: webhook rejected");
            error_response(err.status_code(), err.to_string())
        }
    }
}
