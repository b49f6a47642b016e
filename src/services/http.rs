use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use super::ledger::LedgerRequest;
use super::levels::LevelRequest;
use super::platform::PlatformRequest;
use super::roulette::RouletteRequest;
use super::tasks::TaskRequest;
use super::users::UserRequest;
use super::ServiceError;
use crate::settings::Server;

mod ledger;
mod levels;
mod platform;
mod roulette;
mod tasks;
mod users;

#[derive(Clone)]
pub(super) struct AppState {
    user_channel: mpsc::Sender<UserRequest>,
    level_channel: mpsc::Sender<LevelRequest>,
    ledger_channel: mpsc::Sender<LedgerRequest>,
    task_channel: mpsc::Sender<TaskRequest>,
    roulette_channel: mpsc::Sender<RouletteRequest>,
    platform_channel: mpsc::Sender<PlatformRequest>,
}

/// A request failed before reaching its service (full or closed channel).
pub(super) fn channel_error(e: impl std::fmt::Display) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": format!("Failed to process request: {}", e)})),
    )
}

pub(super) fn service_error(e: &ServiceError) -> (StatusCode, Json<Value>) {
    let status = match e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Rejected(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(json!({"error": e.to_string()})))
}

pub async fn start_http_server(
    server: Server,
    user_channel: mpsc::Sender<UserRequest>,
    level_channel: mpsc::Sender<LevelRequest>,
    ledger_channel: mpsc::Sender<LedgerRequest>,
    task_channel: mpsc::Sender<TaskRequest>,
    roulette_channel: mpsc::Sender<RouletteRequest>,
    platform_channel: mpsc::Sender<PlatformRequest>,
) -> Result<(), anyhow::Error> {
    let app_state = AppState {
        user_channel,
        level_channel,
        ledger_channel,
        task_channel,
        roulette_channel,
        platform_channel,
    };

    let app = Router::new()
        .route("/users", post(users::register))
        .route("/users/{id}", get(users::get_profile))
        .route(
            "/users/{id}/bank",
            put(users::upsert_bank_details).get(users::get_bank_details),
        )
        .route("/users/{id}/withdrawn", get(ledger::total_withdrawn))
        .route("/users/{id}/levels", get(levels::get_purchases))
        .route("/users/{id}/deposits", get(ledger::get_deposits))
        .route("/users/{id}/withdrawals", get(ledger::get_withdrawals))
        .route("/users/{id}/tasks", get(tasks::get_completions))
        .route("/deposits", post(ledger::request_deposit))
        .route("/deposits/{id}/approve", post(ledger::approve_deposit))
        .route("/withdrawals", post(ledger::request_withdrawal))
        .route("/withdrawals/{id}/approve", post(ledger::approve_withdrawal))
        .route("/withdrawals/{id}/reject", post(ledger::reject_withdrawal))
        .route("/levels", get(levels::list_levels))
        .route("/levels/purchase", post(levels::purchase_level))
        .route("/levels/claim", post(levels::claim_daily_gain))
        .route("/tasks", get(tasks::list_definitions))
        .route("/tasks/complete", post(tasks::complete_task))
        .route("/roulette/spin", post(roulette::spin))
        .route("/roulette/{id}/approve", post(roulette::approve_spin))
        .route("/platform", get(platform::get_settings))
        .route("/platform/bank", get(platform::get_bank_details))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port)).await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
