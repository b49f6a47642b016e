use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::services::roulette::RouletteRequest;

#[derive(serde::Deserialize)]
pub struct SpinRequest {
    pub user_id: String,
}

pub async fn spin(
    State(state): State<super::AppState>,
    Json(req): Json<SpinRequest>,
) -> impl IntoResponse {
    let (roulette_tx, roulette_rx) = oneshot::channel();

    let send_result = state
        .roulette_channel
        .send(RouletteRequest::Spin {
            user_id: req.user_id,
            response: roulette_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match roulette_rx.await {
        Ok(Ok(spin)) => (StatusCode::CREATED, Json(json!(spin))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn approve_spin(
    State(state): State<super::AppState>,
    Path(spin_id): Path<String>,
) -> impl IntoResponse {
    let (roulette_tx, roulette_rx) = oneshot::channel();

    let send_result = state
        .roulette_channel
        .send(RouletteRequest::ApproveSpin {
            spin_id,
            response: roulette_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match roulette_rx.await {
        Ok(Ok(spin)) => (StatusCode::OK, Json(json!(spin))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
