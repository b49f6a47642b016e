use crate::models::tasks::{TaskCompletion, TaskDefinition};
use crate::repositories::RepositoryError;

use anyhow::bail;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TaskRepository {
    conn: PgPool,
}

impl TaskRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn list_definitions(&self) -> Result<Vec<TaskDefinition>, anyhow::Error> {
        let definitions =
            sqlx::query_as::<_, TaskDefinition>("SELECT * FROM task_definitions ORDER BY name ASC")
                .fetch_all(&self.conn)
                .await?;

        Ok(definitions)
    }

    /// Records a completion and credits its earnings. Daily tasks are gated
    /// to one completion per calendar day; level-gated tasks require an
    /// active purchase of at least the required tier. The gates are checked
    /// under the user's row lock, so of two racing completions one blocks
    /// and then observes the other's inserted row.
    pub async fn complete_task(
        &self,
        user_id: &str,
        task_definition_id: &str,
    ) -> Result<TaskCompletion, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        let user: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if user.is_none() {
            bail!(RepositoryError::NotFound("user"))
        }

        let definition = sqlx::query_as::<_, TaskDefinition>(
            "SELECT * FROM task_definitions WHERE id = $1",
        )
        .bind(task_definition_id)
        .fetch_optional(&mut *tx)
        .await?;

        let definition = match definition {
            Some(definition) => definition,
            None => bail!(RepositoryError::NotFound("task definition")),
        };

        if let Some(required_level_id) = &definition.required_level {
            let qualified: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM user_levels ul
                    JOIN levels held ON held.id = ul.level_id
                    JOIN levels required ON required.id = $2
                    WHERE ul.user_id = $1
                      AND ul.is_active = TRUE
                      AND held.deposit_value >= required.deposit_value
                )
                "#,
            )
            .bind(user_id)
            .bind(required_level_id)
            .fetch_one(&mut *tx)
            .await?;

            if !qualified {
                bail!(RepositoryError::LevelRequired)
            }
        }

        if definition.is_daily {
            let done_today: bool = sqlx::query_scalar(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM task_completions
                    WHERE user_id = $1
                      AND task_definition_id = $2
                      AND DATE(completed_at) = CURRENT_DATE
                )
                "#,
            )
            .bind(user_id)
            .bind(task_definition_id)
            .fetch_one(&mut *tx)
            .await?;

            if done_today {
                bail!(RepositoryError::TaskAlreadyCompletedToday)
            }
        }

        let completion_id = Uuid::new_v4().hyphenated().to_string();
        let completion = sqlx::query_as::<_, TaskCompletion>(
            r#"
            INSERT INTO task_completions (id, user_id, task_definition_id, earnings)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&completion_id)
        .bind(user_id)
        .bind(task_definition_id)
        .bind(definition.base_earnings)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(definition.base_earnings)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(completion)
    }

    pub async fn get_completions(
        &self,
        user_id: &str,
    ) -> Result<Vec<TaskCompletion>, anyhow::Error> {
        let completions = sqlx::query_as::<_, TaskCompletion>(
            "SELECT * FROM task_completions WHERE user_id = $1 ORDER BY completed_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(completions)
    }
}

// Run with `cargo test -- --ignored` against a scratch database; migrations
// are applied per test.
#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn seed_user(pool: &PgPool, id: &str) {
        sqlx::query(
            "INSERT INTO users (id, phone_number, invite_code) VALUES ($1, $1, $1)",
        )
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn seed_daily_task(pool: &PgPool, id: &str, earnings: Decimal) {
        sqlx::query(
            "INSERT INTO task_definitions (id, name, description, base_earnings, is_daily)
             VALUES ($1, $1, $1, $2, TRUE)",
        )
        .bind(id)
        .bind(earnings)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn balance_of(pool: &PgPool, id: &str) -> Decimal {
        sqlx::query_scalar("SELECT available_balance FROM users WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn concurrent_daily_completions_credit_once(pool: PgPool) {
        seed_user(&pool, "u1").await;
        seed_daily_task(&pool, "t1", dec!(5)).await;

        let repo_a = TaskRepository::new(pool.clone());
        let repo_b = TaskRepository::new(pool.clone());
        let (a, b) = tokio::join!(
            repo_a.complete_task("u1", "t1"),
            repo_b.complete_task("u1", "t1")
        );

        let successes = [a, b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert_eq!(balance_of(&pool, "u1").await, dec!(5));
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn daily_task_is_gated_to_one_completion_per_day(pool: PgPool) {
        seed_user(&pool, "u1").await;
        seed_daily_task(&pool, "t1", dec!(5)).await;

        let repo = TaskRepository::new(pool.clone());
        repo.complete_task("u1", "t1").await.unwrap();

        let err = repo.complete_task("u1", "t1").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::TaskAlreadyCompletedToday)
        ));
        assert_eq!(balance_of(&pool, "u1").await, dec!(5));
    }
}
