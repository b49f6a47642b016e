use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Withdrawal lifecycle. Persisted as text; the closed set keeps typo-class
/// status strings out of the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

impl WithdrawalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::Pending => "pending",
            WithdrawalStatus::Approved => "approved",
            WithdrawalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawalStatus::Pending),
            "approved" => Ok(WithdrawalStatus::Approved),
            "rejected" => Ok(WithdrawalStatus::Rejected),
            other => anyhow::bail!("unknown withdrawal status: {other}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Withdrawal {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub status: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewWithdrawal {
    pub user_id: String,
    pub amount: Decimal,
}

/// Total of the approved withdrawals in the set; pending and rejected rows do
/// not count. Zero when none are approved.
pub fn sum_approved(withdrawals: &[Withdrawal]) -> Decimal {
    withdrawals
        .iter()
        .filter(|w| w.status == WithdrawalStatus::Approved.as_str())
        .map(|w| w.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Approved,
            WithdrawalStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse::<WithdrawalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_text_is_rejected() {
        assert!("Aprovado".parse::<WithdrawalStatus>().is_err());
        assert!("".parse::<WithdrawalStatus>().is_err());
    }

    fn withdrawal(amount: Decimal, status: WithdrawalStatus) -> Withdrawal {
        Withdrawal {
            id: String::new(),
            user_id: String::new(),
            amount,
            status: status.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn sum_approved_excludes_pending_and_rejected() {
        let rows = vec![
            withdrawal(dec!(10), WithdrawalStatus::Approved),
            withdrawal(dec!(20), WithdrawalStatus::Approved),
            withdrawal(dec!(30), WithdrawalStatus::Approved),
            withdrawal(dec!(999), WithdrawalStatus::Pending),
            withdrawal(dec!(500), WithdrawalStatus::Rejected),
        ];

        assert_eq!(sum_approved(&rows), dec!(60));
    }

    #[test]
    fn sum_approved_is_zero_without_approved_rows() {
        assert_eq!(sum_approved(&[]), Decimal::ZERO);

        let rows = vec![withdrawal(dec!(999), WithdrawalStatus::Pending)];
        assert_eq!(sum_approved(&rows), Decimal::ZERO);
    }
}
