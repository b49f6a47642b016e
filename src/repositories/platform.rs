use crate::models::platform::{PlatformBankDetails, PlatformSettings};

use sqlx::PgPool;

#[derive(Clone)]
pub struct PlatformRepository {
    conn: PgPool,
}

impl PlatformRepository {
    pub fn new(conn: PgPool) -> Self {
        Self { conn }
    }

    pub async fn get_settings(&self) -> Result<Option<PlatformSettings>, anyhow::Error> {
        let settings =
            sqlx::query_as::<_, PlatformSettings>("SELECT * FROM platform_settings LIMIT 1")
                .fetch_optional(&self.conn)
                .await?;

        Ok(settings)
    }

    pub async fn get_bank_details(&self) -> Result<Vec<PlatformBankDetails>, anyhow::Error> {
        let details = sqlx::query_as::<_, PlatformBankDetails>(
            "SELECT * FROM platform_bank_details ORDER BY id ASC",
        )
        .fetch_all(&self.conn)
        .await?;

        Ok(details)
    }
}
