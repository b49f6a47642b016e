use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::tasks;
use crate::repositories::tasks::TaskRepository;

pub enum TaskRequest {
    ListDefinitions {
        response: oneshot::Sender<Result<Vec<tasks::TaskDefinition>, ServiceError>>,
    },
    CompleteTask {
        user_id: String,
        task_definition_id: String,
        response: oneshot::Sender<Result<tasks::TaskCompletion, ServiceError>>,
    },
    GetCompletions {
        user_id: String,
        response: oneshot::Sender<Result<Vec<tasks::TaskCompletion>, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct TaskRequestHandler {
    repository: TaskRepository,
}

impl TaskRequestHandler {
    pub fn new(sql_conn: PgPool) -> Self {
        let repository = TaskRepository::new(sql_conn);

        TaskRequestHandler { repository }
    }
}

#[async_trait]
impl RequestHandler<TaskRequest> for TaskRequestHandler {
    async fn handle_request(&self, request: TaskRequest) {
        match request {
            TaskRequest::ListDefinitions { response } => {
                let result = self
                    .repository
                    .list_definitions()
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            TaskRequest::CompleteTask {
                user_id,
                task_definition_id,
                response,
            } => {
                let result = self
                    .repository
                    .complete_task(&user_id, &task_definition_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
            TaskRequest::GetCompletions { user_id, response } => {
                let result = self
                    .repository
                    .get_completions(&user_id)
                    .await
                    .map_err(ServiceError::from_repository);
                let _ = response.send(result);
            }
        }
    }
}

pub struct TaskService;

impl TaskService {
    pub fn new() -> Self {
        TaskService {}
    }
}

#[async_trait]
impl Service<TaskRequest, TaskRequestHandler> for TaskService {}
