use crate::domain::{Delivery, Snapshot};
use crate::interface_adapters::protocol::ErrorResponse;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{IngestEvent, PlayerRecord};
use axum::{Json, extract::State, http::StatusCode};
use std::collections::BTreeMap;
use std::sync::Arc;

// Accept one game state snapshot and queue it for the engine.
pub async fn ingest_snapshot(
    State(state): State<Arc<AppState>>,
    Json(snapshot): Json<Snapshot>,
) -> Result<&'static str, (StatusCode, Json<ErrorResponse>)> {
    state
        .ingest_tx
        .send(IngestEvent::Snapshot(Box::new(snapshot)))
        .await
        .map_err(|_| {
            tracing::error!("snapshot engine is not running");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "snapshot engine unavailable")
        })?;

    Ok("OK")
}

// Latest derived stats keyed by player.
pub async fn damage_data(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, PlayerRecord>> {
    Json(state.latest_view().players.clone())
}

// Active courier deliveries in start order.
pub async fn delivery_data(State(state): State<Arc<AppState>>) -> Json<Vec<Delivery>> {
    Json(state.latest_view().deliveries.clone())
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
}
