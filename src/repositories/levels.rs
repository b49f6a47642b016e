use crate::models::levels::{self, ClaimOutcome, Level, UserLevel};
use crate::repositories::RepositoryError;

use anyhow::bail;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct LevelRepository {
    conn: PgPool,
}

impl LevelRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn list_levels(&self) -> Result<Vec<Level>, anyhow::Error> {
        let levels = sqlx::query_as::<_, Level>("SELECT * FROM levels ORDER BY deposit_value ASC")
            .fetch_all(&self.conn)
            .await?;

        Ok(levels)
    }

    pub async fn get_level(&self, level_id: &str) -> Result<Option<Level>, anyhow::Error> {
        let level = sqlx::query_as::<_, Level>("SELECT * FROM levels WHERE id = $1")
            .bind(level_id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(level)
    }

    /// Purchases a level: debits the level's deposit value from the user's
    /// available balance and opens an active purchase, in one transaction.
    /// Only one purchase may be active at a time; the debit takes the user's
    /// row lock first, so two racing purchases resolve to one open purchase
    /// and one rejection.
    pub async fn purchase_level(
        &self,
        user_id: &str,
        level_id: &str,
    ) -> Result<UserLevel, anyhow::Error> {
        let level = match self.get_level(level_id).await? {
            Some(level) => level,
            None => bail!(RepositoryError::NotFound("level")),
        };

        let mut tx = self.conn.begin().await?;

        let debited = sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance - $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND available_balance >= $1
            "#,
        )
        .bind(level.deposit_value)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            bail!(RepositoryError::InsufficientBalance)
        }

        let already_active: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_levels WHERE user_id = $1 AND is_active = TRUE)",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_active {
            bail!(RepositoryError::ActivePurchaseExists)
        }

        let purchase_id = Uuid::new_v4().hyphenated().to_string();
        let purchase = sqlx::query_as::<_, UserLevel>(
            r#"
            INSERT INTO user_levels (id, user_id, level_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&purchase_id)
        .bind(user_id)
        .bind(level_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    /// Applies the daily gain for the user's active purchase at most once per
    /// 24-hour window. The purchase row is locked for the duration of the
    /// transaction, so of two concurrent claims one blocks and then observes
    /// the other's `last_daily_gain_date`.
    pub async fn claim_daily_gain(&self, user_id: &str) -> Result<ClaimOutcome, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        let purchase = sqlx::query_as::<_, UserLevel>(
            r#"
            SELECT * FROM user_levels
            WHERE user_id = $1 AND is_active = TRUE
            ORDER BY purchase_date DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let purchase = match purchase {
            Some(purchase) => purchase,
            None => return Ok(ClaimOutcome::NoActivePurchase),
        };

        let now = Utc::now().naive_utc();
        if !levels::daily_gain_due(purchase.last_daily_gain_date, now) {
            // Checked under the lock: the second of two racing claims lands here.
            return Ok(ClaimOutcome::NotDue {
                last_credit: purchase
                    .last_daily_gain_date
                    .unwrap_or(purchase.purchase_date),
            });
        }

        let level = sqlx::query_as::<_, Level>("SELECT * FROM levels WHERE id = $1")
            .bind(&purchase.level_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(level.daily_gain)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        let cycle_complete = levels::cycle_complete(purchase.purchase_date, level.cycle_days, now);
        sqlx::query(
            r#"
            UPDATE user_levels
            SET last_daily_gain_date = $1, is_active = $2
            WHERE id = $3
            "#,
        )
        .bind(now)
        .bind(!cycle_complete)
        .bind(&purchase.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ClaimOutcome::Credited {
            amount: level.daily_gain,
            credited_at: now,
            cycle_complete,
        })
    }

    pub async fn get_purchases(&self, user_id: &str) -> Result<Vec<UserLevel>, anyhow::Error> {
        let purchases = sqlx::query_as::<_, UserLevel>(
            "SELECT * FROM user_levels WHERE user_id = $1 ORDER BY purchase_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.conn)
        .await?;

        Ok(purchases)
    }
}

// Run with `cargo test -- --ignored` against a scratch database; migrations
// are applied per test.
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use sqlx::PgPool;

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

    async fn seed_level(pool: &PgPool, id: &str, deposit: Decimal, daily: Decimal, cycle: i32) {
        sqlx::query(
            "INSERT INTO levels (id, name, deposit_value, daily_gain, monthly_gain, cycle_days)
             VALUES ($1, $1, $2, $3, $3, $4)",
        )
        .bind(id)
        .bind(deposit)
        .bind(daily)
        .bind(cycle)
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
    async fn concurrent_claims_credit_once(pool: PgPool) {
        seed_user(&pool, "u1", dec!(0)).await;
        seed_level(&pool, "l1", dec!(100), dec!(7), 30).await;
        sqlx::query("INSERT INTO user_levels (id, user_id, level_id) VALUES ('p1', 'u1', 'l1')")
            .execute(&pool)
            .await
            .unwrap();

        let repo_a = LevelRepository::new(pool.clone());
        let repo_b = LevelRepository::new(pool.clone());
        let (a, b) = tokio::join!(repo_a.claim_daily_gain("u1"), repo_b.claim_daily_gain("u1"));

        let credits = [a.unwrap(), b.unwrap()]
            .iter()
            .filter(|o| matches!(o, ClaimOutcome::Credited { .. }))
            .count();
        assert_eq!(credits, 1);
        assert_eq!(balance_of(&pool, "u1").await, dec!(7));
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn claim_within_window_is_not_applied(pool: PgPool) {
        seed_user(&pool, "u1", dec!(0)).await;
        seed_level(&pool, "l1", dec!(100), dec!(7), 30).await;

        let recently = Utc::now().naive_utc() - Duration::hours(23);
        sqlx::query(
            "INSERT INTO user_levels (id, user_id, level_id, last_daily_gain_date)
             VALUES ('p1', 'u1', 'l1', $1)",
        )
        .bind(recently)
        .execute(&pool)
        .await
        .unwrap();

        let repo = LevelRepository::new(pool.clone());
        let outcome = repo.claim_daily_gain("u1").await.unwrap();

        assert!(matches!(outcome, ClaimOutcome::NotDue { .. }));
        assert_eq!(balance_of(&pool, "u1").await, dec!(0));
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn claim_past_cycle_end_retires_the_purchase(pool: PgPool) {
        seed_user(&pool, "u1", dec!(0)).await;
        seed_level(&pool, "l1", dec!(100), dec!(7), 30).await;

        let long_ago = Utc::now().naive_utc() - Duration::days(31);
        let yesterday = Utc::now().naive_utc() - Duration::hours(25);
        sqlx::query(
            "INSERT INTO user_levels (id, user_id, level_id, purchase_date, last_daily_gain_date)
             VALUES ('p1', 'u1', 'l1', $1, $2)",
        )
        .bind(long_ago)
        .bind(yesterday)
        .execute(&pool)
        .await
        .unwrap();

        let repo = LevelRepository::new(pool.clone());
        let outcome = repo.claim_daily_gain("u1").await.unwrap();

        assert!(matches!(
            outcome,
            ClaimOutcome::Credited {
                cycle_complete: true,
                ..
            }
        ));
        assert_eq!(balance_of(&pool, "u1").await, dec!(7));

        let still_active: bool =
            sqlx::query_scalar("SELECT is_active FROM user_levels WHERE id = 'p1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(!still_active);
    }

    #[ignore = "requires a Postgres instance via DATABASE_URL"]
    #[sqlx::test]
    async fn second_purchase_while_active_is_rejected(pool: PgPool) {
        seed_user(&pool, "u1", dec!(500)).await;
        seed_level(&pool, "l1", dec!(100), dec!(7), 30).await;
        seed_level(&pool, "l2", dec!(200), dec!(15), 30).await;

        let repo = LevelRepository::new(pool.clone());
        repo.purchase_level("u1", "l1").await.unwrap();

        let err = repo.purchase_level("u1", "l2").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::ActivePurchaseExists)
        ));
        // The rejected purchase's debit must have rolled back.
        assert_eq!(balance_of(&pool, "u1").await, dec!(400));
    }
}
