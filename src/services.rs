use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::settings::Settings;

mod http;
mod ledger;
mod levels;
mod platform;
mod roulette;
mod tasks;
mod users;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    pub fn from_repository(e: anyhow::Error) -> Self {
        use crate::repositories::RepositoryError;

        match e.downcast_ref::<RepositoryError>() {
            Some(RepositoryError::NotFound(_)) | Some(RepositoryError::AlreadyResolved(_)) => {
                ServiceError::NotFound(e.to_string())
            }
            Some(_) => ServiceError::Rejected(e.to_string()),
            None => ServiceError::Database(e.to_string()),
        }
    }
}

#[async_trait]
pub trait RequestHandler<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    async fn handle_request(&self, request: T);
}

#[async_trait]
pub trait Service<T, H>: Send + Sync + 'static
where
    T: Send + 'static,
    H: RequestHandler<T> + Clone + Send,
{
    async fn run(&mut self, handler: H, receiver: &mut mpsc::Receiver<T>) {
        while let Some(request) = receiver.recv().await {
            let handler = handler.clone();

            tokio::spawn(async move {
                handler.handle_request(request).await;
            });
        }
    }
}

pub async fn start_services(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let (user_tx, mut user_rx) = mpsc::channel(512);
    let (level_tx, mut level_rx) = mpsc::channel(512);
    let (ledger_tx, mut ledger_rx) = mpsc::channel(512);
    let (task_tx, mut task_rx) = mpsc::channel(512);
    let (roulette_tx, mut roulette_rx) = mpsc::channel(512);
    let (platform_tx, mut platform_rx) = mpsc::channel(512);

    let mut user_service = users::UserService::new();
    let mut level_service = levels::LevelService::new();
    let mut ledger_service = ledger::LedgerService::new();
    let mut task_service = tasks::TaskService::new();
    let mut roulette_service = roulette::RouletteService::new();
    let mut platform_service = platform::PlatformService::new();

    log::info!("Starting user service.");
    let user_pool_clone = pool.clone();
    tokio::spawn(async move {
        user_service
            .run(
                users::UserRequestHandler::new(user_pool_clone),
                &mut user_rx,
            )
            .await;
    });

    log::info!("Starting level service.");
    let level_pool_clone = pool.clone();
    tokio::spawn(async move {
        level_service
            .run(
                levels::LevelRequestHandler::new(level_pool_clone),
                &mut level_rx,
            )
            .await;
    });

    log::info!("Starting ledger service.");
    let ledger_pool_clone = pool.clone();
    tokio::spawn(async move {
        ledger_service
            .run(
                ledger::LedgerRequestHandler::new(ledger_pool_clone),
                &mut ledger_rx,
            )
            .await;
    });

    log::info!("Starting task service.");
    let task_pool_clone = pool.clone();
    tokio::spawn(async move {
        task_service
            .run(
                tasks::TaskRequestHandler::new(task_pool_clone),
                &mut task_rx,
            )
            .await;
    });

    log::info!("Starting roulette service.");
    let roulette_pool_clone = pool.clone();
    tokio::spawn(async move {
        roulette_service
            .run(
                roulette::RouletteRequestHandler::new(roulette_pool_clone),
                &mut roulette_rx,
            )
            .await;
    });

    log::info!("Starting platform service.");
    let platform_pool_clone = pool.clone();
    tokio::spawn(async move {
        platform_service
            .run(
                platform::PlatformRequestHandler::new(platform_pool_clone),
                &mut platform_rx,
            )
            .await;
    });

    log::info!("Starting HTTP server.");
    http::start_http_server(
        settings.server,
        user_tx,
        level_tx,
        ledger_tx,
        task_tx,
        roulette_tx,
        platform_tx,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::RepositoryError;

    #[test]
    fn repository_errors_are_classified() {
        let e = ServiceError::from_repository(RepositoryError::InsufficientBalance.into());
        assert!(matches!(e, ServiceError::Rejected(_)));

        let e = ServiceError::from_repository(RepositoryError::NotFound("user").into());
        assert!(matches!(e, ServiceError::NotFound(_)));

        let e = ServiceError::from_repository(RepositoryError::AlreadyResolved("deposit").into());
        assert!(matches!(e, ServiceError::NotFound(_)));

        let e = ServiceError::from_repository(anyhow::anyhow!("connection reset"));
        assert!(matches!(e, ServiceError::Database(_)));
    }

    #[test]
    fn storage_error_text_does_not_leak_into_rejections() {
        // Message content must not influence classification; only the typed
        // repository error does.
        let e = ServiceError::from_repository(anyhow::anyhow!("relation not found"));
        assert!(matches!(e, ServiceError::Database(_)));

        let e = ServiceError::from_repository(anyhow::anyhow!("lock already held"));
        assert!(matches!(e, ServiceError::Database(_)));
    }
}
