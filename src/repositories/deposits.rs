use crate::models::deposits::Deposit;
use crate::repositories::RepositoryError;

use anyhow::bail;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct DepositRepository {
    conn: PgPool,
}

impl DepositRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn new_deposit(
        &self,
        user_id: &str,
        amount: Decimal,
        proof_of_payment: &str,
    ) -> Result<Deposit, anyhow::Error> {
        if amount <= Decimal::ZERO {
            bail!(RepositoryError::InvalidAmount)
        }

        let deposit_id = Uuid::new_v4().hyphenated().to_string();
        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
            INSERT INTO deposits (id, user_id, amount, proof_of_payment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&deposit_id)
        .bind(user_id)
        .bind(amount)
        .bind(proof_of_payment)
        .fetch_one(&self.conn)
        .await?;

        Ok(deposit)
    }

    /// Back-office approval: flips the flag and credits the user's available
    /// balance in one transaction. The `is_approved = FALSE` guard makes a
    /// repeated approval a no-op instead of a double credit.
    pub async fn approve_deposit(&self, deposit_id: &str) -> Result<Deposit, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
            UPDATE deposits
            SET is_approved = TRUE
            WHERE id = $1 AND is_approved = FALSE
            RETURNING *
            "#,
        )
        .bind(deposit_id)
        .fetch_optional(&mut *tx)
        .await?;

        let deposit = match deposit {
            Some(deposit) => deposit,
            None => bail!(RepositoryError::AlreadyResolved("deposit")),
        };

        sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(deposit.amount)
        .bind(&deposit.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(deposit)
    }

    pub async fn get_deposits(&self, user_id: &str) -> Result<Vec<Deposit>, anyhow::Error> {
        let deposits = sqlx::query_as::<_, Deposit>(
            "SELECT * FROM deposits WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(deposits)
    }
}
