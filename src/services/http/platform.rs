use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tokio::sync::oneshot;

use crate::services::platform::PlatformRequest;

pub async fn get_settings(State(state): State<super::AppState>) -> impl IntoResponse {
    let (platform_tx, platform_rx) = oneshot::channel();

    let send_result = state
        .platform_channel
        .send(PlatformRequest::GetSettings {
            response: platform_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match platform_rx.await {
        Ok(Ok(Some(settings))) => (StatusCode::OK, Json(json!(settings))),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Platform settings not configured"})),
        ),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_bank_details(State(state): State<super::AppState>) -> impl IntoResponse {
    let (platform_tx, platform_rx) = oneshot::channel();

    let send_result = state
        .platform_channel
        .send(PlatformRequest::GetBankDetails {
            response: platform_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match platform_rx.await {
        Ok(Ok(details)) => (StatusCode::OK, Json(json!(details))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
