use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::levels;
use crate::services::levels::LevelRequest;

pub async fn list_levels(State(state): State<super::AppState>) -> impl IntoResponse {
    let (level_tx, level_rx) = oneshot::channel();

    let send_result = state
        .level_channel
        .send(LevelRequest::ListLevels { response: level_tx })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match level_rx.await {
        Ok(Ok(levels)) => (StatusCode::OK, Json(json!(levels))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn purchase_level(
    State(state): State<super::AppState>,
    Json(req): Json<levels::NewPurchase>,
) -> impl IntoResponse {
    let (level_tx, level_rx) = oneshot::channel();

    let send_result = state
        .level_channel
        .send(LevelRequest::PurchaseLevel {
            user_id: req.user_id,
            level_id: req.level_id,
            response: level_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match level_rx.await {
        Ok(Ok(purchase)) => (StatusCode::CREATED, Json(json!(purchase))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

#[derive(serde::Deserialize)]
pub struct ClaimRequest {
    pub user_id: String,
}

pub async fn claim_daily_gain(
    State(state): State<super::AppState>,
    Json(req): Json<ClaimRequest>,
) -> impl IntoResponse {
    let (level_tx, level_rx) = oneshot::channel();

    let send_result = state
        .level_channel
        .send(LevelRequest::ClaimDailyGain {
            user_id: req.user_id,
            response: level_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match level_rx.await {
        Ok(Ok(outcome)) => {
            let status = match outcome {
                levels::ClaimOutcome::Credited { .. } => StatusCode::OK,
                levels::ClaimOutcome::NotDue { .. } => StatusCode::CONFLICT,
                levels::ClaimOutcome::NoActivePurchase => StatusCode::NOT_FOUND,
            };
            (status, Json(json!(outcome)))
        }
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_purchases(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (level_tx, level_rx) = oneshot::channel();

    let send_result = state
        .level_channel
        .send(LevelRequest::GetPurchases {
            user_id,
            response: level_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match level_rx.await {
        Ok(Ok(purchases)) => (StatusCode::OK, Json(json!(purchases))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
