use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::platform;
use crate::repositories::platform::PlatformRepository;

pub enum PlatformRequest {
    GetSettings {
        response: oneshot::Sender<Result<Option<platform::PlatformSettings>, ServiceError>>,
    },
    GetBankDetails {
        response: oneshot::Sender<Result<Vec<platform::PlatformBankDetails>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct PlatformRequestHandler {
    repository: PlatformRepository,
}

impl PlatformRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = PlatformRepository::new(sql_conn);

        PlatformRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<PlatformRequest> for PlatformRequestHandler {
    async fn handle_request(&self, request: PlatformRequest) {
        match request {
            PlatformRequest::GetSettings { response } => {
                let result = self
                    .repository
                    .get_settings()
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            PlatformRequest::GetBankDetails { response } => {
                let result = self
                    .repository
                    .get_bank_details()
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct PlatformService;

impl PlatformService {
    pub fn new() -> Self {
        PlatformService {}
    }
}

#[async_trait]
impl Service<PlatformRequest, PlatformRequestHandler> for PlatformService {}
