use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::error;
use uuid::Uuid;

use crate::{
    application::usecases::payments::{PaymentUseCase, RateGateway},
    domain::{
        repositories::payments::PaymentLedgerRepository,
        value_objects::payments::CreatePaymentModel,
    },
    infrastructure::axum_http::error_responses::error_response,
};

pub fn routes<L, R>(usecase: Arc<PaymentUseCase<L, R>>) -> Router
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    R: RateGateway + Send + Sync + 'static,
{
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/:payment_id", get(get_payment))
        .with_state(usecase)
}

pub async fn create_payment<L, R>(
    State(usecase): State<Arc<PaymentUseCase<L, R>>>,
    Json(model): Json<CreatePaymentModel>,
) -> Response
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    R: RateGateway + Send + Sync + 'static,
{
    match usecase.create_payment(model).await {
        Ok(payment) => (StatusCode::CREATED, Json(payment)).into_response(),
        Err(err) => {
            error!(error = %err, "payments router: create_payment failed");
            error_response(err.status_code(), err.to_string())
        }
    }
}

pub async fn get_payment<L, R>(
    State(usecase): State<Arc<PaymentUseCase<L, R>>>,
    Path(payment_id): Path<Uuid>,
) -> Response
where
    L: PaymentLedgerRepository + Send + Sync + 'static,
    R: RateGateway + Send + Sync + 'static,
{
    match usecase.get_payment(payment_id).await {
        Ok(payment) => (StatusCode::OK, Json(payment)).into_response(),
        Err(err) => error_response(err.status_code(), err.to_string()),
    }
}
