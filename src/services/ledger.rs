use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::{deposits, withdrawals};
use crate::repositories::deposits::DepositRepository;
use crate::repositories::withdrawals::WithdrawalRepository;

pub enum LedgerRequest {
    NewDeposit {
        user_id: String,
        amount: Decimal,
        proof_of_payment: String,
        response: oneshot::Sender<Result<deposits::Deposit, ServiceError>>,
    },
    ApproveDeposit {
        deposit_id: String,
        response: oneshot::Sender<Result<deposits::Deposit, ServiceError>>,
    },
    NewWithdrawal {
        user_id: String,
        amount: Decimal,
        response: oneshot::Sender<Result<withdrawals::Withdrawal, ServiceError>>,
    },
    ResolveWithdrawal {
        withdrawal_id: String,
        status: withdrawals::WithdrawalStatus,
        response: oneshot::Sender<Result<withdrawals::Withdrawal, ServiceError>>,
    },
    TotalWithdrawn {
        user_id: String,
        response: oneshot::Sender<Result<Decimal, ServiceError>>,
    },
    GetDeposits {
        user_id: String,
        response: oneshot::Sender<Result<Vec<deposits::Deposit>, ServiceError>>,
    },
    GetWithdrawals {
        user_id: String,
        response: oneshot::Sender<Result<Vec<withdrawals::Withdrawal>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct LedgerRequestHandler {
    deposits: DepositRepository,
    withdrawals: WithdrawalRepository,
}

impl LedgerRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let deposits = DepositRepository::new(sql_conn.clone());
        let withdrawals = WithdrawalRepository::new(sql_conn);

        LedgerRequestHandler {
            deposits,
            withdrawals,
        }
    }
}

#[async_trait]
impl RequestHandler<LedgerRequest> for LedgerRequestHandler {
    async fn handle_request(&self, request: LedgerRequest) {
        match request {
            LedgerRequest::NewDeposit {
                user_id,
                amount,
                proof_of_payment,
                response,
            } => {
                let result = self
                    .deposits
                    .new_deposit(&user_id, amount, &proof_of_payment)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LedgerRequest::ApproveDeposit {
                deposit_id,
                response,
            } => {
                let result = self
                    .deposits
                    .approve_deposit(&deposit_id)
                    .await
                    .map_err(ServiceError::from_repository);
                if let Ok(deposit) = &result {
                    log::info!(
                        "Approved deposit {} of {} for user {}.",
                        deposit.id,
                        deposit.amount,
                        deposit.user_id
                    );
                }
                let _ = response.send(result);
            }
            LedgerRequest::NewWithdrawal {
                user_id,
                amount,
                response,
            } => {
                let result = self
                    .withdrawals
                    .new_withdrawal(&user_id, amount)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LedgerRequest::ResolveWithdrawal {
                withdrawal_id,
                status,
                response,
            } => {
                let result = self
                    .withdrawals
                    .set_withdrawal_status(&withdrawal_id, status)
                    .await
                    .map_err(ServiceError::from_repository);
                if let Ok(withdrawal) = &result {
                    log::info!(
                        "Withdrawal {} resolved as {} for user {}.",
                        withdrawal.id,
                        withdrawal.status,
                        withdrawal.user_id
                    );
                }
                let _ = response.send(result);
            }
            LedgerRequest::TotalWithdrawn { user_id, response } => {
                let result = self
                    .withdrawals
                    .total_approved(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LedgerRequest::GetDeposits { user_id, response } => {
                let result = self
                    .deposits
                    .get_deposits(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LedgerRequest::GetWithdrawals { user_id, response } => {
                let result = self
                    .withdrawals
                    .get_withdrawals(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        LedgerService {}
    }
}

#[async_trait]
impl Service<LedgerRequest, LedgerRequestHandler> for LedgerService {}
