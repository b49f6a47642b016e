use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct RouletteSpin {
    pub id: String,
    pub user_id: String,
    pub prize: Decimal,
    pub spin_date: chrono::NaiveDateTime,
    pub is_approved: bool,
}

/// Singleton row holding the prize list as a comma-separated string,
/// edited through the back office.
#[derive(Clone, Debug, Deserialize, Serialize, sqlx::FromRow)]
pub struct RouletteSettings {
    pub id: i32,
    pub prizes: Option<String>,
}

/// Parses the configured CSV prize list, skipping blanks. Malformed entries
/// are an error rather than a silent zero prize.
pub fn parse_prizes(prizes: &str) -> Result<Vec<Decimal>, anyhow::Error> {
    prizes
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<Decimal>()
                .map_err(|e| anyhow::anyhow!("invalid prize value {p:?}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parses_csv_prize_list() {
        let prizes = parse_prizes("100, 200,500,1000").unwrap();
        assert_eq!(prizes, vec![dec!(100), dec!(200), dec!(500), dec!(1000)]);
    }

    #[test]
    fn blank_entries_are_skipped() {
        assert_eq!(parse_prizes("10,,20, ").unwrap(), vec![dec!(10), dec!(20)]);
    }

    #[test]
    fn empty_list_yields_no_prizes() {
        assert!(parse_prizes("").unwrap().is_empty());
    }

    #[test]
    fn malformed_entry_is_an_error() {
        assert!(parse_prizes("100,abc").is_err());
    }
}
