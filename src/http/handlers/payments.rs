use crate::domain::payment::{CreatePaymentRequest, PaymentFilter, UpdatePaymentRequest};
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

pub async fn create_payment(
    State(state): State<AppState>,
    Json(req): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    match state.payment_service.create(req).await {
        Ok(payment) => (axum::http::StatusCode::CREATED, Json(payment)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
) -> impl IntoResponse {
    match state.payment_service.list(filter).await {
        Ok(payments) => (axum::http::StatusCode::OK, Json(payments)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.payment_service.get(id).await {
        Ok(payment) => (axum::http::StatusCode::OK, Json(payment)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePaymentRequest>,
) -> impl IntoResponse {
    match state.payment_service.update(id, req).await {
        Ok(payment) => (axum::http::StatusCode::OK, Json(payment)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn health() -> impl IntoResponse {
    (axum::http::StatusCode::OK, "ok")
}
