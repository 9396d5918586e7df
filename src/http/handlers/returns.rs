use axum::extract::Query;
use axum::response::IntoResponse;
use axum::Json;
use std::collections::HashMap;

// Browser back-URLs for the hosted checkout. Informational only; status
// changes come exclusively through webhook reconciliation.

pub async fn success(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    tracing::info!("checkout returned approved: {:?}", query);
    Json(serde_json::json!({ "ok": true, "message": "payment approved", "query": query }))
}

pub async fn failure(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    tracing::warn!("checkout returned failure: {:?}", query);
    Json(serde_json::json!({ "ok": false, "message": "payment failed", "query": query }))
}

pub async fn pending(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    tracing::info!("checkout returned pending: {:?}", query);
    Json(serde_json::json!({ "ok": true, "message": "payment pending", "query": query }))
}
