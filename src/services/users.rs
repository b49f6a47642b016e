use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::{platform, users};
use crate::repositories::users::UserRepository;
use crate::repositories::withdrawals::WithdrawalRepository;

pub enum UserRequest {
    CreateUser {
        phone_number: String,
        full_name: Option<String>,
        invite_code: Option<String>,
        response: oneshot::Sender<Result<users::User, ServiceError>>,
    },
    GetProfile {
        id: String,
        response: oneshot::Sender<Result<Option<users::UserProfile>, ServiceError>>,
    },
    UpsertBankDetails {
        id: String,
        details: platform::NewBankDetails,
        response: oneshot::Sender<Result<platform::BankDetails, ServiceError>>,
    },
    GetBankDetails {
        id: String,
        response: oneshot::Sender<Result<Option<platform::BankDetails>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct UserRequestHandler {
    repository: UserRepository,
    withdrawals: WithdrawalRepository,
}

impl UserRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = UserRepository::new(sql_conn.clone());
        let withdrawals = WithdrawalRepository::new(sql_conn);

        UserRequestHandler {
            repository,
            withdrawals,
        }
    }

    async fn create_user(
        &self,
        phone_number: String,
        full_name: Option<String>,
        invite_code: Option<String>,
    ) -> Result<users::User, ServiceError> {
        self.repository
            .insert_user(&phone_number, full_name, invite_code)
            .await
            .map_err(ServiceError::from_repository)
    }

    async fn get_profile(&self, id: &str) -> Result<Option<users::UserProfile>, ServiceError> {
        let user = self
            .repository
            .get_user_by_id(id)
            .await
            .map_err(ServiceError::from_repository)?;

        let user = match user {
            Some(user) => user,
            None => return Ok(None),
        };

        let active_level = self
            .repository
            .get_active_level(id)
            .await
            .map_err(ServiceError::from_repository)?;
        let total_withdrawn = self
            .withdrawals
            .total_approved(id)
            .await
            .map_err(ServiceError::from_repository)?;

        Ok(Some(users::UserProfile {
            user,
            active_level,
            total_withdrawn,
        }))
    }
}

#[async_trait]
impl RequestHandler<UserRequest> for UserRequestHandler {
    async fn handle_request(&self, request: UserRequest) {
        match request {
            UserRequest::CreateUser {
                phone_number,
                full_name,
                invite_code,
                response,
            } => {
                let user = self.create_user(phone_number, full_name, invite_code).await;
                let _ = response.send(user);
            }
            UserRequest::GetProfile { id, response } => {
                let profile = self.get_profile(&id).await;
                let _ = response.send(profile);
            }
            UserRequest::UpsertBankDetails {
                id,
                details,
                response,
            } => {
                let result = self
                    .repository
                    .upsert_bank_details(&id, &details)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            UserRequest::GetBankDetails { id, response } => {
                let result = self
                    .repository
                    .get_bank_details(&id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct UserService;

impl UserService {
    pub fn new() -> Self {
        UserService {}
    }
}

#[async_trait]
impl Service<UserRequest, UserRequestHandler> for UserService {}
