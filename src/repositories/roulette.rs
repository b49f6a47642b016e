use crate::models::roulette::{self, RouletteSettings, RouletteSpin};
use crate::repositories::RepositoryError;

use anyhow::bail;
use rand::seq::SliceRandom;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct RouletteRepository {
    conn: PgPool,
}

impl RouletteRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn get_settings(&self) -> Result<Option<RouletteSettings>, anyhow::Error> {
        let settings =
            sqlx::query_as::<_, RouletteSettings>("SELECT * FROM roulette_settings LIMIT 1")
                .fetch_optional(&self.conn)
                .await?;

        Ok(settings)
    }

    /// Consumes one of the user's spins and records an unapproved prize drawn
    /// uniformly from the configured list. The spin counter is decremented
    /// with a guard so a user cannot spend the same spin twice.
    pub async fn spin(&self, user_id: &str) -> Result<RouletteSpin, anyhow::Error> {
        let prizes = match self.get_settings().await? {
            Some(settings) => roulette::parse_prizes(settings.prizes.as_deref().unwrap_or(""))?,
            None => Vec::new(),
        };
        if prizes.is_empty() {
            bail!(RepositoryError::NoPrizesConfigured)
        }

        let prize = {
            let mut rng = rand::thread_rng();
            *prizes
                .choose(&mut rng)
                .ok_or_else(|| anyhow::anyhow!("empty prize list"))?
        };

        let mut tx = self.conn.begin().await?;

        let spent = sqlx::query(
            r#"
            UPDATE users
            SET roulette_spins = roulette_spins - 1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $1 AND roulette_spins > 0
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if spent.rows_affected() == 0 {
            bail!(RepositoryError::NoSpinsLeft)
        }

        let spin_id = Uuid::new_v4().hyphenated().to_string();
        let spin = sqlx::query_as::<_, RouletteSpin>(
            r#"
            INSERT INTO roulette_spins (id, user_id, prize)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&spin_id)
        .bind(user_id)
        .bind(prize)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(spin)
    }

    /// Credits the prize once the back office approves the spin. Mirrors
    /// deposit approval, including the repeated-approval no-op guard.
    pub async fn approve_spin(&self, spin_id: &str) -> Result<RouletteSpin, anyhow::Error> {
        let mut tx = self.conn.begin().await?;

        let spin = sqlx::query_as::<_, RouletteSpin>(
            r#"
            UPDATE roulette_spins
            SET is_approved = TRUE
            WHERE id = $1 AND is_approved = FALSE
            RETURNING *
            "#,
        )
        .bind(spin_id)
        .fetch_optional(&mut *tx)
        .await?;

        let spin = match spin {
            Some(spin) => spin,
            None => bail!(RepositoryError::AlreadyResolved("spin")),
        };

        sqlx::query(
            r#"
            UPDATE users
            SET available_balance = available_balance + $1, updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            "#,
        )
        .bind(spin.prize)
        .bind(&spin.user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(spin)
    }
}
