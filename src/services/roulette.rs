use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::roulette;
use crate::repositories::roulette::RouletteRepository;

pub enum RouletteRequest {
    Spin {
        user_id: String,
        response: oneshot::Sender<Result<roulette::RouletteSpin, ServiceError>>,
    },
    ApproveSpin {
        spin_id: String,
        response: oneshot::Sender<Result<roulette::RouletteSpin, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct RouletteRequestHandler {
    repository: RouletteRepository,
}

impl RouletteRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = RouletteRepository::new(sql_conn);

        RouletteRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<RouletteRequest> for RouletteRequestHandler {
    async fn handle_request(&self, request: RouletteRequest) {
        match request {
            RouletteRequest::Spin { user_id, response } => {
                let result = self
                    .repository
                    .spin(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                if let Ok(spin) = &result {
                    log::info!("User {} spun a prize of {}.", spin.user_id, spin.prize);
                }
                let _ = response.send(result);
            }
            RouletteRequest::ApproveSpin { spin_id, response } => {
                let result = self
                    .repository
                    .approve_spin(&spin_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct RouletteService;

impl RouletteService {
    pub fn new() -> Self {
        RouletteService {}
    }
}

#[async_trait]
impl Service<RouletteRequest, RouletteRequestHandler> for RouletteService {}
