use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing, Json, Router,
};
use folio_core_health_contracts::{HealthFeatureService, HealthStatus};
use serde::Serialize;

use crate::errors::method_not_allowed;

pub fn router(service: Arc<impl HealthFeatureService>) -> Router<()> {
    Router::new()
        .route(
            "/health",
            routing::get(health).fallback(method_not_allowed),
        )
        .with_state(service)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    /// Milliseconds since the unix epoch
    ts: i64,
}

async fn health(service: State<Arc<impl HealthFeatureService>>) -> Response {
    let HealthStatus { timestamp } = service.get_status().await;

    Json(HealthResponse {
        status: "ok",
        ts: timestamp.timestamp_millis(),
    })
    .into_response()
}
