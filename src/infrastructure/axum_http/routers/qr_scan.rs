use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::warn;

use crate::{
    application::usecases::qr_scan::QrScanUseCase,
    domain::value_objects::payment_intent::ScanQrModel,
    infrastructure::axum_http::error_responses::error_response,
};

pub fn routes(usecase: Arc<QrScanUseCase>) -> Router {
    Router::new()
        .route("/scan", post(scan))
        .with_state(usecase)
}

pub async fn scan(
    State(usecase): State<Arc<QrScanUseCase>>,
    Json(model): Json<ScanQrModel>,
) -> Response {
    match usecase.scan(&model.raw) {
        Ok(intent) => (axum::http::StatusCode::OK, Json(intent)).into_response(),
        Err(err) => {
            warn!(error = %err, "qr_scan router: scan rejected");
            error_response(err.status_code(), err.to_string())
        }
    }
}
