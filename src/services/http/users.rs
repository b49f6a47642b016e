use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::{platform, users};
use crate::services::users::UserRequest;

pub async fn register(
    State(state): State<super::AppState>,
    Json(req): Json<users::NewUser>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::CreateUser {
            phone_number: req.phone_number,
            full_name: req.full_name,
            invite_code: req.invite_code,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match user_rx.await {
        Ok(Ok(user)) => (StatusCode::CREATED, Json(json!(user))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_profile(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::GetProfile {
            id: user_id,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match user_rx.await {
        Ok(Ok(Some(profile))) => (StatusCode::OK, Json(json!(profile))),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "User not found"})),
        ),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn upsert_bank_details(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
    Json(req): Json<platform::NewBankDetails>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::UpsertBankDetails {
            id: user_id,
            details: req,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match user_rx.await {
        Ok(Ok(details)) => (StatusCode::OK, Json(json!(details))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_bank_details(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (user_tx, user_rx) = oneshot::channel();

    let send_result = state
        .user_channel
        .send(UserRequest::GetBankDetails {
            id: user_id,
            response: user_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match user_rx.await {
        Ok(Ok(Some(details))) => (StatusCode::OK, Json(json!(details))),
        Ok(Ok(None)) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No bank details on file"})),
        ),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
