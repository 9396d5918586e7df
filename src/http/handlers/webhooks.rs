use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

/// Always acknowledges with 200: the gateway only wants receipt confirmation
/// and retries on its own schedule when a delivery is not acknowledged.
pub async fn notification(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    tracing::info!("webhook received: {}", body);
    state.notification_service.handle(body).await;
    axum::http::StatusCode::OK
}
