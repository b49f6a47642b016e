use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Deposit {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub proof_of_payment: String,
    pub is_approved: bool,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewDeposit {
    pub user_id: String,
    pub amount: Decimal,
    pub proof_of_payment: String,
}
