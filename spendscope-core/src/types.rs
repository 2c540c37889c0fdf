use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Uniform transaction row produced by the statement loaders.
///
/// `date` keeps the raw statement text (reports echo it verbatim);
/// `parsed_date` drives month filtering and sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub parsed_date: NaiveDate,
    /// Raw statement description the vendor was derived from.
    pub description: String,
    pub vendor: String,
    pub category: String,
    /// Negative = spend/debit, positive = credit.
    pub amount: f64,
}

impl Transaction {
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_roundtrips_through_json() {
        let tx = Transaction {
            date: "01/14/2026".to_string(),
            parsed_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            description: "KROGER #123 ATLANTA GA".to_string(),
            vendor: "KROGER".to_string(),
            category: "Groceries & Markets".to_string(),
            amount: -45.67,
        };
        let s = serde_json::to_string(&tx).unwrap();
        let back: Transaction = serde_json::from_str(&s).unwrap();
        assert_eq!(back, tx);
        assert_eq!(back.abs_amount(), 45.67);
    }
}
