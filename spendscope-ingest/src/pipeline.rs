//! Shared tail of every loader: exclusion filter, date parsing, month
//! restriction, then vendor normalization and classification.

use spendscope_core::{
    is_income_or_transfer, normalize_vendor, parse_date_flex, MonthTarget, RuleSet, Transaction,
};

/// A statement row before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub date: String,
    pub description: String,
    pub amount: f64,
}

/// Filter, restrict to the target month, and enrich raw rows into the
/// uniform transaction table. Rows with unparseable dates are discarded.
pub fn finish_rows(rows: Vec<RawRow>, rules: &RuleSet, target: MonthTarget) -> Vec<Transaction> {
    rows.into_iter()
        .filter(|r| !is_income_or_transfer(&r.description))
        .filter_map(|r| {
            let parsed = parse_date_flex(&r.date, target.year)?;
            if !target.contains(parsed) {
                return None;
            }
            let vendor = normalize_vendor(&r.description);
            let category = rules.classify(&vendor).to_string();
            Some(Transaction {
                date: r.date,
                parsed_date: parsed,
                description: r.description,
                vendor,
                category,
                amount: r.amount,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> MonthTarget {
        MonthTarget::parse("02/2026").unwrap()
    }

    fn row(date: &str, desc: &str, amount: f64) -> RawRow {
        RawRow {
            date: date.to_string(),
            description: desc.to_string(),
            amount,
        }
    }

    #[test]
    fn test_month_restriction() {
        let rows = vec![
            row("02/14/2026", "KROGER #123", -45.67),
            row("01/14/2026", "KROGER #123", -10.00),
            row("02/14/2025", "KROGER #123", -10.00),
        ];
        let txns = finish_rows(rows, &RuleSet::default(), target());
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].vendor, "KROGER");
    }

    #[test]
    fn test_income_rows_dropped_before_dating() {
        let rows = vec![
            row("02/01/2026", "ACME PAYROLL", 2500.0),
            row("02/02/2026", "ONLINE BANKING PAYMENT TO CRD", -300.0),
            row("02/03/2026", "SHELL OIL 5744", -38.2),
        ];
        let txns = finish_rows(rows, &RuleSet::default(), target());
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].vendor, "SHELL");
    }

    #[test]
    fn test_unparseable_dates_discarded() {
        let rows = vec![row("pending", "KROGER", -5.0), row("02/14", "KROGER", -5.0)];
        let txns = finish_rows(rows, &RuleSet::default(), target());
        assert_eq!(txns.len(), 1);
        assert_eq!(
            txns[0].parsed_date,
            chrono::NaiveDate::from_ymd_opt(2026, 2, 14).unwrap()
        );
    }
}
