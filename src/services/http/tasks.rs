use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::tasks;
use crate::services::tasks::TaskRequest;

pub async fn list_definitions(State(state): State<super::AppState>) -> impl IntoResponse {
    let (task_tx, task_rx) = oneshot::channel();

    let send_result = state
        .task_channel
        .send(TaskRequest::ListDefinitions { response: task_tx })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match task_rx.await {
        Ok(Ok(definitions)) => (StatusCode::OK, Json(json!(definitions))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn complete_task(
    State(state): State<super::AppState>,
    Json(req): Json<tasks::CompleteTask>,
) -> impl IntoResponse {
    let (task_tx, task_rx) = oneshot::channel();

    let send_result = state
        .task_channel
        .send(TaskRequest::CompleteTask {
            user_id: req.user_id,
            task_definition_id: req.task_definition_id,
            response: task_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match task_rx.await {
        Ok(Ok(completion)) => (StatusCode::CREATED, Json(json!(completion))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_completions(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (task_tx, task_rx) = oneshot::channel();

    let send_result = state
        .task_channel
        .send(TaskRequest::GetCompletions {
            user_id,
            response: task_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match task_rx.await {
        Ok(Ok(completions)) => (StatusCode::OK, Json(json!(completions))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
