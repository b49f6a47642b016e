use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::levels;
use crate::repositories::levels::LevelRepository;

pub enum LevelRequest {
    ListLevels {
        response: oneshot::Sender<Result<Vec<levels::Level>, ServiceError>>,
    },
    PurchaseLevel {
        user_id: String,
        level_id: String,
        response: oneshot::Sender<Result<levels::UserLevel, ServiceError>>,
    },
    ClaimDailyGain {
        user_id: String,
        response: oneshot::Sender<Result<levels::ClaimOutcome, ServiceError>>,
    },
    GetPurchases {
        user_id: String,
        response: oneshot::Sender<Result<Vec<levels::UserLevel>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct LevelRequestHandler {
    repository: LevelRepository,
}

impl LevelRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = LevelRepository::new(sql_conn);

        LevelRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<LevelRequest> for LevelRequestHandler {
    async fn handle_request(&self, request: LevelRequest) {
        match request {
            LevelRequest::ListLevels { response } => {
                let result = self
                    .repository
                    .list_levels()
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LevelRequest::PurchaseLevel {
                user_id,
                level_id,
                response,
            } => {
                let result = self
                    .repository
                    .purchase_level(&user_id, &level_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            LevelRequest::ClaimDailyGain { user_id, response } => {
                let result = self
                    .repository
                    .claim_daily_gain(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                if let Ok(levels::ClaimOutcome::Credited { amount, .. }) = &result {
                    log::info!("Credited daily gain of {} to user {}.", amount, user_id);
                }
                let _ = response.send(result);
            }
            LevelRequest::GetPurchases { user_id, response } => {
                let result = self
                    .repository
                    .get_purchases(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct LevelService;

impl LevelService {
    pub fn new() -> Self {
        LevelService {}
    }
}

#[async_trait]
impl Service<LevelRequest, LevelRequestHandler> for LevelService {}
