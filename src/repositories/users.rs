use crate::models::{levels, platform, users};
use crate::repositories::RepositoryError;

use anyhow::bail;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    conn: PgPool,
}

impl UserRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn insert_user(
        &self,
        phone_number: &str,
        full_name: Option<String>,
        referrer_code: Option<String>,
    ) -> Result<users::User, anyhow::Error> {
        if phone_number.trim().is_empty() {
            bail!(RepositoryError::PhoneNumberRequired)
        }

        let user_id = Uuid::new_v4().hyphenated().to_string();

        let invited_by: Option<String> = match referrer_code {
            Some(code) => {
                let referrer = sqlx::query_as::<_, users::User>(
                    "SELECT * FROM users WHERE invite_code = $1",
                )
                .bind(&code)
                .fetch_optional(&self.conn)
                .await?;
                referrer.map(|r| r.id)
            }
            None => None,
        };

        let invite_code = self.allocate_invite_code().await?;

        let user = sqlx::query_as::<_, users::User>(
            r#"
                INSERT INTO users (id, phone_number, full_name, invite_code, invited_by)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            "#,
        )
        .bind(&user_id)
        .bind(phone_number)
        .bind(&full_name)
        .bind(&invite_code)
        .bind(&invited_by)
        .fetch_one(&self.conn)
        .await?;

        Ok(user)
    }

    /// Draws candidate codes until one not already assigned is found. The
    /// code space is large relative to the user set, so collisions are rare
    /// and the retry loop is unbounded.
    async fn allocate_invite_code(&self) -> Result<String, anyhow::Error> {
        loop {
            let code = users::generate_invite_code();
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE invite_code = $1)",
            )
            .bind(&code)
            .fetch_one(&self.conn)
            .await?;

            if !taken {
                return Ok(code);
            }
        }
    }

    pub async fn get_user_by_id(
        &self,
        user_id: &str,
    ) -> Result<Option<users::User>, anyhow::Error> {
        let user = sqlx::query_as::<_, users::User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.conn)
            .await?;

        Ok(user)
    }

    /// The level behind the user's active purchase, if any.
    pub async fn get_active_level(
        &self,
        user_id: &str,
    ) -> Result<Option<levels::Level>, anyhow::Error> {
        let level = sqlx::query_as::<_, levels::Level>(
            r#"
            SELECT l.* FROM levels l
            JOIN user_levels ul ON ul.level_id = l.id
            WHERE ul.user_id = $1 AND ul.is_active = TRUE
            ORDER BY ul.purchase_date DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(level)
    }

    pub async fn upsert_bank_details(
        &self,
        user_id: &str,
        details: &platform::NewBankDetails,
    ) -> Result<platform::BankDetails, anyhow::Error> {
        let user = self.get_user_by_id(user_id).await?;
        if user.is_none() {
            bail!(RepositoryError::NotFound("user"))
        }

        let bank_details = sqlx::query_as::<_, platform::BankDetails>(
            r#"
            INSERT INTO bank_details (user_id, bank_name, iban, account_holder_name)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET bank_name = $2, iban = $3, account_holder_name = $4
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&details.bank_name)
        .bind(&details.iban)
        .bind(&details.account_holder_name)
        .fetch_one(&self.conn)
        .await?;

        Ok(bank_details)
    }

    pub async fn get_bank_details(
        &self,
        user_id: &str,
    ) -> Result<Option<platform::BankDetails>, anyhow::Error> {
        let details = sqlx::query_as::<_, platform::BankDetails>(
            "SELECT * FROM bank_details WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.conn)
        .await?;

        Ok(details)
    }
}
