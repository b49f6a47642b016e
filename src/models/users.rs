use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::levels;

/// Characters of a UUIDv4 hex string used for invite codes.
pub const INVITE_CODE_LEN: usize = 8;

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub phone_number: String,
    pub full_name: Option<String>,
    pub invite_code: String,
    pub invited_by: Option<String>,
    pub available_balance: Decimal,
    pub subsidy_balance: Decimal,
    pub is_active: bool,
    pub roulette_spins: i32,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub phone_number: String,
    pub full_name: Option<String>,
    pub invite_code: Option<String>,
}

/// The user row plus the two derived fields the profile page shows.
#[derive(Clone, Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub active_level: Option<levels::Level>,
    pub total_withdrawn: Decimal,
}

/// A candidate invite code. Uniqueness is checked against the user set
/// before assignment; callers regenerate on collision.
pub fn generate_invite_code() -> String {
    Uuid::new_v4().simple().to_string()[..INVITE_CODE_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_code_is_short_lowercase_hex() {
        for _ in 0..32 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn invite_codes_vary() {
        assert_ne!(generate_invite_code(), generate_invite_code());
    }
}
