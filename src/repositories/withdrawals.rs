use crate::models::withdrawals::{self, Withdrawal, WithdrawalStatus};
use crate::repositories::RepositoryError;

use anyhow::bail;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct WithdrawalRepository {
    conn: PgPool,
}

impl WithdrawalRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn new_withdrawal(
        &self,
        user_id: &str,
        amount: Decimal,
    ) -> Result<Withdrawal, anyhow::Error> {
        if amount <= Decimal::ZERO {
            bail!(RepositoryError::InvalidAmount)
        }

        let balance: Option<Decimal> =
            sqlx::query_scalar("SELECT available_balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.conn)
                .await?;

        let balance = match balance {
            Some(balance) => balance,
            None => bail!(RepositoryError::NotFound("user")),
        };
        if amount > balance {
            bail!(RepositoryError::InsufficientBalance)
        }

        let withdrawal_id = Uuid::new_v4().hyphenated().to_string();
        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            INSERT INTO withdrawals (id, user_id, amount, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&withdrawal_id)
        .bind(user_id)
        .bind(amount)
        .bind(WithdrawalStatus::Pending.as_str())
        .fetch_one(&self.conn)
        .await?;

        Ok(withdrawal)
    }

    /// Back-office resolution of a pending withdrawal. Approval debits the
    /// user's balance after re-checking sufficiency under the transaction;
    /// rejection only moves the status. Non-pending rows are left alone.
    pub async fn set_withdrawal_status(
        &self,
        withdrawal_id: &str,
        status: WithdrawalStatus,
    ) -> Result<Withdrawal, anyhow::Error> {
        if status == WithdrawalStatus::Pending {
            bail!(RepositoryError::InvalidStatusTransition)
        }

        let mut tx = self.conn.begin().await?;

        let withdrawal = sqlx::query_as::<_, Withdrawal>(
            r#"
            UPDATE withdrawals
            SET status = $1
            WHERE id = $2 AND status = $3
            RETURNING *
            "#,
        )
        .bind(status.as_str())
        .bind(withdrawal_id)
        .bind(WithdrawalStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let withdrawal = match withdrawal {
            Some(withdrawal) => withdrawal,
            None => bail!(RepositoryError::AlreadyResolved("withdrawal")),
        };

        if status == WithdrawalStatus::Approved {
            let debited = sqlx::query(
                r#"
                UPDATE users
                SET available_balance = available_balance - $1, updated_at = CURRENT_TIMESTAMP
                WHERE id = $2 AND available_balance >= $1
                "#,
            )
            .bind(withdrawal.amount)
            .bind(&withdrawal.user_id)
            .execute(&mut *tx)
            .await?;

            if debited.rows_affected() == 0 {
                bail!(RepositoryError::InsufficientBalance)
            }
        }

        tx.commit().await?;

        Ok(withdrawal)
    }

    /// Sum of the user's approved withdrawals; zero when there are none.
    pub async fn total_approved(&self, user_id: &str) -> Result<Decimal, anyhow::Error> {
        let rows = self.get_withdrawals(user_id).await?;

        Ok(withdrawals::sum_approved(&rows))
    }

    pub async fn get_withdrawals(&self, user_id: &str) -> Result<Vec<Withdrawal>, anyhow::Error> {
        let withdrawals = sqlx::query_as::<_, Withdrawal>(
            "SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(withdrawals)
    }
}

// Run with `cargo test -- --ignored` against a scratch database; migrations
// are applied per test.
#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn seed_user(pool: &PgPool, id: &str, balance: Decimal) {
        sqlx::query(
            "INSERT INTO users (id, phone_number, invite_code, available_balance)
             VALUES ($1, $1, $1, $2)",
        )
        .bind(id)
        .bind(balance)
        .execute(pool)
        .await
        .unwrap();
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn total_approved_counts_approved_rows_only(pool: PgPool) {
        seed_user(&pool, "u1", dec!(1000)).await;

        let repo = WithdrawalRepository::new(pool.clone());
        for amount in [dec!(10), dec!(20), dec!(30)] {
            let w = repo.new_withdrawal("u1", amount).await.unwrap();
            repo.set_withdrawal_status(&w.id, WithdrawalStatus::Approved)
                .await
                .unwrap();
        }
        repo.new_withdrawal("u1", dec!(999)).await.unwrap();

        assert_eq!(repo.total_approved("u1").await.unwrap(), dec!(60));
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn total_approved_is_zero_without_approved_rows(pool: PgPool) {
        seed_user(&pool, "u1", dec!(1000)).await;

        let repo = WithdrawalRepository::new(pool.clone());
        assert_eq!(repo.total_approved("u1").await.unwrap(), Decimal::ZERO);

        repo.new_withdrawal("u1", dec!(999)).await.unwrap();
        assert_eq!(repo.total_approved("u1").await.unwrap(), Decimal::ZERO);
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn approval_debits_and_repeats_are_rejected(pool: PgPool) {
        seed_user(&pool, "u1", dec!(100)).await;

        let repo = WithdrawalRepository::new(pool.clone());
        let w = repo.new_withdrawal("u1", dec!(40)).await.unwrap();
        repo.set_withdrawal_status(&w.id, WithdrawalStatus::Approved)
            .await
            .unwrap();

        let balance: Decimal =
            sqlx::query_scalar("SELECT available_balance FROM users WHERE id = 'u1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(balance, dec!(60));

        let err = repo
            .set_withdrawal_status(&w.id, WithdrawalStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::AlreadyResolved(_))
        ));
    }
}
