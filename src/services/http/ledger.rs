use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tokio::sync::oneshot;

use crate::models::{deposits, withdrawals};
use crate::services::ledger::LedgerRequest;

pub async fn request_deposit(
    State(state): State<super::AppState>,
    Json(req): Json<deposits::NewDeposit>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::NewDeposit {
            user_id: req.user_id,
            amount: req.amount,
            proof_of_payment: req.proof_of_payment,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(deposit)) => (StatusCode::CREATED, Json(json!(deposit))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn approve_deposit(
    State(state): State<super::AppState>,
    Path(deposit_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::ApproveDeposit {
            deposit_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(deposit)) => (StatusCode::OK, Json(json!(deposit))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn request_withdrawal(
    State(state): State<super::AppState>,
    Json(req): Json<withdrawals::NewWithdrawal>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::NewWithdrawal {
            user_id: req.user_id,
            amount: req.amount,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(withdrawal)) => (StatusCode::CREATED, Json(json!(withdrawal))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

async fn resolve_withdrawal(
    state: super::AppState,
    withdrawal_id: String,
    status: withdrawals::WithdrawalStatus,
) -> (StatusCode, Json<serde_json::Value>) {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::ResolveWithdrawal {
            withdrawal_id,
            status,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(withdrawal)) => (StatusCode::OK, Json(json!(withdrawal))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn approve_withdrawal(
    State(state): State<super::AppState>,
    Path(withdrawal_id): Path<String>,
) -> impl IntoResponse {
    resolve_withdrawal(state, withdrawal_id, withdrawals::WithdrawalStatus::Approved).await
}

pub async fn reject_withdrawal(
    State(state): State<super::AppState>,
    Path(withdrawal_id): Path<String>,
) -> impl IntoResponse {
    resolve_withdrawal(state, withdrawal_id, withdrawals::WithdrawalStatus::Rejected).await
}

pub async fn get_deposits(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::GetDeposits {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(deposits)) => (StatusCode::OK, Json(json!(deposits))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn get_withdrawals(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::GetWithdrawals {
            user_id,
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(withdrawals)) => (StatusCode::OK, Json(json!(withdrawals))),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}

pub async fn total_withdrawn(
    State(state): State<super::AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let (ledger_tx, ledger_rx) = oneshot::channel();

    let send_result = state
        .ledger_channel
        .send(LedgerRequest::TotalWithdrawn {
            user_id: user_id.clone(),
            response: ledger_tx,
        })
        .await;
    if let Err(e) = send_result {
        return super::channel_error(e);
    }

    match ledger_rx.await {
        Ok(Ok(total)) => (
            StatusCode::OK,
            Json(json!({"user_id": user_id, "total_withdrawn": total})),
        ),
        Ok(Err(service_error)) => super::service_error(&service_error),
        Err(e) => super::channel_error(e),
    }
}
