use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog entry for a task. `required_level` gates completion on holding an
/// active purchase of at least that tier.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_earnings: Decimal,
    pub is_daily: bool,
    pub required_level: Option<String>,
}

/// Audit record of a completion. `earnings` captures the amount credited at
/// completion time, decoupled from the definition's current base.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct TaskCompletion {
    pub id: String,
    pub user_id: String,
    pub task_definition_id: String,
    pub earnings: Decimal,
    pub completed_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CompleteTask {
    pub user_id: String,
    pub task_definition_id: String,
}
