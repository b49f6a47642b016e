use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable investment tier. Reference data managed by the back office.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub deposit_value: Decimal,
    pub daily_gain: Decimal,
    pub monthly_gain: Decimal,
    pub cycle_days: i32,
    pub image_path: Option<String>,
}

/// A user's purchase of a level. Only active purchases participate in accrual;
/// `last_daily_gain_date` is null until the first credit.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct UserLevel {
    pub id: String,
    pub user_id: String,
    pub level_id: String,
    pub purchase_date: NaiveDateTime,
    pub is_active: bool,
    pub last_daily_gain_date: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPurchase {
    pub user_id: String,
    pub level_id: String,
}

/// Outcome of a daily-gain claim attempt.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ClaimOutcome {
    /// The gain was credited at `credited_at`; `cycle_complete` reports
    /// whether this claim also retired the purchase.
    Credited {
        amount: Decimal,
        credited_at: NaiveDateTime,
        cycle_complete: bool,
    },
    /// Less than a full window has elapsed since the last credit.
    NotDue { last_credit: NaiveDateTime },
    /// The user holds no active purchase.
    NoActivePurchase,
}

/// Eligible when no credit was ever applied, or a full 24-hour window has
/// elapsed since the last one.
pub fn daily_gain_due(last_daily_gain_date: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    match last_daily_gain_date {
        None => true,
        Some(last) => now - last >= Duration::hours(24),
    }
}

/// A purchase retires once `cycle_days` days have elapsed since purchase.
pub fn cycle_complete(purchase_date: NaiveDateTime, cycle_days: i32, now: NaiveDateTime) -> bool {
    now - purchase_date >= Duration::days(cycle_days as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn first_credit_is_due_immediately() {
        assert!(daily_gain_due(None, at(0)));
    }

    #[test]
    fn not_due_after_23_hours() {
        let last = at(0);
        assert!(!daily_gain_due(Some(last), at(23)));
    }

    #[test]
    fn due_after_exactly_24_hours() {
        let last = at(0);
        assert!(daily_gain_due(Some(last), last + Duration::hours(24)));
    }

    #[test]
    fn due_after_25_hours() {
        let last = at(0);
        assert!(daily_gain_due(Some(last), last + Duration::hours(25)));
    }

    #[test]
    fn cycle_runs_for_its_full_length() {
        let bought = at(12);
        assert!(!cycle_complete(bought, 30, bought + Duration::days(29)));
        assert!(cycle_complete(bought, 30, bought + Duration::days(30)));
    }
}
