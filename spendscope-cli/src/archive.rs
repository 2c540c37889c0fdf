//! Per-month transaction archive: `transactions_YYYY-MM.json` files under
//! the app home. Side data for the NLQ layer and month comparisons; the
//! report pipeline never reads it back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use spendscope_core::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveRecord {
    pub date: String,
    pub vendor: String,
    pub category: String,
    pub amount: f64,
}

impl From<&Transaction> for ArchiveRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date.clone(),
            vendor: tx.vendor.clone(),
            category: tx.category.clone(),
            amount: tx.amount,
        }
    }
}

pub struct TransactionArchive {
    dir: PathBuf,
}

impl TransactionArchive {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(crate::home::archive_dir()?))
    }

    fn month_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("transactions_{key}.json"))
    }

    /// Replace the archive for one month (`YYYY-MM`) with this run's rows.
    /// Re-running a month must not duplicate its transactions.
    pub fn store_month(&self, key: &str, txns: &[Transaction]) -> Result<usize> {
        let records: Vec<ArchiveRecord> = txns.iter().map(ArchiveRecord::from).collect();
        let path = self.month_path(key);
        let json = serde_json::to_string_pretty(&records)?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(records.len())
    }

    pub fn load_month(&self, key: &str) -> Result<Vec<ArchiveRecord>> {
        let path = self.month_path(key);
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("read {}", path.display()))?;
        Ok(serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?)
    }

    /// Months with archived data, ascending (`YYYY-MM` sorts naturally).
    pub fn available_months(&self) -> Result<Vec<String>> {
        let mut months = Vec::new();
        if !self.dir.exists() {
            return Ok(months);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(key) = name
                .strip_prefix("transactions_")
                .and_then(|n| n.strip_suffix(".json"))
            {
                months.push(key.to_string());
            }
        }
        months.sort();
        Ok(months)
    }

    fn category_totals(records: &[ArchiveRecord]) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for r in records {
            *totals.entry(r.category.clone()).or_default() += r.amount.abs();
        }
        totals
    }

    /// Two-month comparison context fed to the LLM. Defaults to the latest
    /// and previous archived months.
    pub fn comparison_context(&self, month1: Option<&str>, month2: Option<&str>) -> Result<String> {
        let months = self.available_months()?;
        let latest = month1
            .map(str::to_string)
            .or_else(|| months.last().cloned());
        let previous = month2
            .map(str::to_string)
            .or_else(|| months.iter().rev().nth(1).cloned());

        let (Some(latest), Some(previous)) = (latest, previous) else {
            anyhow::bail!("No transaction data for two months yet; run some reports first");
        };

        let latest_records = self.load_month(&latest)?;
        let previous_records = self.load_month(&previous)?;
        let latest_totals = Self::category_totals(&latest_records);
        let previous_totals = Self::category_totals(&previous_records);

        let mut out = String::new();
        out.push_str(&format!("SPENDING COMPARISON: {previous} vs {latest}\n\n"));

        let mut categories: Vec<&String> =
            latest_totals.keys().chain(previous_totals.keys()).collect();
        categories.sort();
        categories.dedup();

        for cat in categories {
            let a = previous_totals.get(cat).copied().unwrap_or(0.0);
            let b = latest_totals.get(cat).copied().unwrap_or(0.0);
            out.push_str(&format!(
                "  {cat}: {previous} = ${a:.2}, {latest} = ${b:.2}, change = ${:+.2}\n",
                b - a
            ));
        }

        let total_a: f64 = previous_totals.values().sum();
        let total_b: f64 = latest_totals.values().sum();
        out.push_str(&format!(
            "\n  TOTAL: {previous} = ${total_a:.2}, {latest} = ${total_b:.2}, change = ${:+.2}\n",
            total_b - total_a
        ));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tx(vendor: &str, category: &str, amount: f64) -> Transaction {
        Transaction {
            date: "01/14/2026".to_string(),
            parsed_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
            description: format!("{vendor} #123"),
            vendor: vendor.to_string(),
            category: category.to_string(),
            amount,
        }
    }

    #[test]
    fn test_store_and_load_month() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TransactionArchive::new(dir.path().to_path_buf());

        let n = archive
            .store_month("2026-01", &[tx("KROGER", "Groceries & Markets", -45.67)])
            .unwrap();
        assert_eq!(n, 1);

        let records = archive.load_month("2026-01").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vendor, "KROGER");
        assert_eq!(archive.available_months().unwrap(), vec!["2026-01"]);
    }

    #[test]
    fn test_rerun_replaces_not_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TransactionArchive::new(dir.path().to_path_buf());
        archive
            .store_month("2026-01", &[tx("KROGER", "Groceries & Markets", -45.67)])
            .unwrap();
        archive
            .store_month("2026-01", &[tx("KROGER", "Groceries & Markets", -45.67)])
            .unwrap();
        assert_eq!(archive.load_month("2026-01").unwrap().len(), 1);
    }

    #[test]
    fn test_comparison_context() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TransactionArchive::new(dir.path().to_path_buf());
        archive
            .store_month("2026-01", &[tx("KROGER", "Groceries & Markets", -100.0)])
            .unwrap();
        archive
            .store_month(
                "2026-02",
                &[
                    tx("KROGER", "Groceries & Markets", -150.0),
                    tx("SHELL", "Auto & Gas", -40.0),
                ],
            )
            .unwrap();

        let ctx = archive.comparison_context(None, None).unwrap();
        assert!(ctx.contains("2026-01 vs 2026-02"));
        assert!(ctx.contains("Groceries & Markets: 2026-01 = $100.00, 2026-02 = $150.00"));
        assert!(ctx.contains("change = $+50.00"));
        assert!(ctx.contains("Auto & Gas: 2026-01 = $0.00"));
    }

    #[test]
    fn test_comparison_needs_two_months() {
        let dir = tempfile::tempdir().unwrap();
        let archive = TransactionArchive::new(dir.path().to_path_buf());
        archive
            .store_month("2026-01", &[tx("KROGER", "Groceries & Markets", -100.0)])
            .unwrap();
        assert!(archive.comparison_context(None, None).is_err());
    }
}
