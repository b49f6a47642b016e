use serde::{Deserialize, Serialize};

/// Singleton platform configuration, edited through the back office and read
/// at request time.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct PlatformSettings {
    pub id: i32,
    pub whatsapp_link: String,
    pub app_download_link: String,
    pub history_text: String,
    pub deposit_instruction: String,
    pub withdrawal_instruction: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct PlatformBankDetails {
    pub id: i32,
    pub bank_name: String,
    pub iban: String,
    pub account_holder_name: String,
}

/// A user's payout account. One row per user.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct BankDetails {
    pub user_id: String,
    pub bank_name: String,
    pub iban: String,
    pub account_holder_name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewBankDetails {
    pub bank_name: String,
    pub iban: String,
    pub account_holder_name: String,
}
