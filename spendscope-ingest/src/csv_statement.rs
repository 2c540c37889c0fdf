//! CSV statement loader: sniffs one of four known export layouts by header
//! names, then runs the shared enrichment pipeline.
//!
//! Layout precedence (first match wins):
//!   1. running-balance exports (`Date, Description, Amount, Running Bal.`)
//!   2. `Posted Date` / `Payee` credit card exports
//!   3. `Credit` / `Debit` pair exports
//!   4. generic `Date, Description, Amount`
//!
//! One known export prepends 5 junk rows before the header; when no layout
//! matches the first row we retry once with those rows skipped.

use anyhow::{bail, Context, Result};
use std::path::Path;

use spendscope_core::{MonthTarget, RuleSet, Transaction};

use crate::pipeline::{finish_rows, RawRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Balance,
    PostedPayee,
    CreditDebit,
    Generic,
}

/// Lower-cased, trimmed header names.
fn header_names(headers: &csv::StringRecord) -> Vec<String> {
    headers.iter().map(|h| h.trim().to_lowercase()).collect()
}

fn sniff(names: &[String]) -> Option<Layout> {
    let has = |n: &str| names.iter().any(|h| h == n);

    if names.iter().any(|h| h.contains("bal")) && has("amount") && has("description") && has("date")
    {
        return Some(Layout::Balance);
    }
    if has("posted date") && has("payee") && has("amount") {
        return Some(Layout::PostedPayee);
    }
    if has("credit") && has("debit") && has("description") && has("date") {
        return Some(Layout::CreditDebit);
    }
    if has("date") && has("description") && has("amount") {
        return Some(Layout::Generic);
    }
    None
}

/// Strip `$` and thousands separators, then parse.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(['$', ','], "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

fn extract_rows(content: &str) -> Result<Vec<RawRow>> {
    let attempt = |text: &str| -> Result<Option<Vec<RawRow>>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let names = header_names(rdr.headers().context("reading CSV header")?);
        let Some(layout) = sniff(&names) else {
            return Ok(None);
        };

        let col = |n: &str| names.iter().position(|h| h == n);
        let date_col = match layout {
            Layout::PostedPayee => col("posted date"),
            _ => col("date"),
        };
        let desc_col = match layout {
            Layout::PostedPayee => col("payee"),
            _ => col("description"),
        };
        let (date_col, desc_col) = match (date_col, desc_col) {
            (Some(d), Some(p)) => (d, p),
            _ => return Ok(None),
        };

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let field = |c: usize| record.get(c).unwrap_or("").trim();

            let amount = match layout {
                Layout::CreditDebit => {
                    // coerce-with-zero: blank or junk cells count as 0
                    let credit = col("credit").and_then(|c| parse_amount(field(c))).unwrap_or(0.0);
                    let debit = col("debit").and_then(|c| parse_amount(field(c))).unwrap_or(0.0);
                    credit - debit
                }
                _ => {
                    let Some(a) = col("amount").and_then(|c| parse_amount(field(c))) else {
                        continue;
                    };
                    a
                }
            };

            rows.push(RawRow {
                date: field(date_col).to_string(),
                description: field(desc_col).to_string(),
                amount,
            });
        }
        Ok(Some(rows))
    };

    if let Some(rows) = attempt(content)? {
        return Ok(rows);
    }

    // Retry with the 5 leading junk rows dropped.
    let skipped: String = content
        .lines()
        .skip(5)
        .map(|l| format!("{l}\n"))
        .collect();
    if let Some(rows) = attempt(&skipped)? {
        return Ok(rows);
    }

    bail!("unrecognized CSV format (no known column layout)");
}

/// Load a CSV statement into the uniform transaction table for one month.
pub fn load_csv_statement(
    path: impl AsRef<Path>,
    rules: &RuleSet,
    target: MonthTarget,
) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let rows =
        extract_rows(&content).with_context(|| format!("in file {}", path.display()))?;
    Ok(finish_rows(rows, rules, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RULES: &str = "\
RuleID,Priority,VendorPattern,Category,Explanation,OverrideRuleID,IsCustom,CreatedDate
G001,50,KROGER,Groceries & Markets,groceries,,No,2026-01-01
A002,100,KROGER FUEL,Auto & Gas,fuel center,G001,No,2026-01-01
";

    fn rules() -> RuleSet {
        RuleSet::from_reader(RULES.as_bytes()).unwrap()
    }

    fn target() -> MonthTarget {
        MonthTarget::parse("01/2026").unwrap()
    }

    #[test]
    fn test_balance_layout() {
        let csv = "\
Date,Description,Amount,Running Bal.
01/14/2026,KROGER #123 ATLANTA GA,\"-45.67\",\"1,204.33\"
01/15/2026,ACME PAYROLL DEPOSIT,\"2,500.00\",\"3,704.33\"
02/02/2026,KROGER #123 ATLANTA GA,-12.00,\"3,692.33\"
";
        let rows = extract_rows(csv).unwrap();
        assert_eq!(rows.len(), 3);
        let txns = finish_rows(rows, &rules(), target());
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].vendor, "KROGER");
        assert_eq!(txns[0].category, "Groceries & Markets");
        assert_eq!(txns[0].amount, -45.67);
    }

    #[test]
    fn test_posted_payee_layout() {
        let csv = "\
Posted Date,Payee,Amount
01/03/2026,KROGER FUEL CENTER 992,-30.10
01/04/2026,SOMEPLACE ELSE,-9.99
";
        let txns = finish_rows(extract_rows(csv).unwrap(), &rules(), target());
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].vendor, "KROGER FUEL");
        assert_eq!(txns[0].category, "Auto & Gas");
        // unmatched vendor falls back to the default category
        assert_eq!(txns[1].category, spendscope_core::DEFAULT_CATEGORY);
    }

    #[test]
    fn test_credit_debit_layout() {
        let csv = "\
Date,Description,Credit,Debit
01/10/2026,KROGER #55,,50.00
01/11/2026,REFUND KROGER #55,25.00,
";
        let txns = finish_rows(extract_rows(csv).unwrap(), &rules(), target());
        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].amount, -50.0);
        assert_eq!(txns[1].amount, 25.0);
    }

    #[test]
    fn test_amounts_with_separators() {
        let csv = "\
Date,Description,Amount
01/10/2026,KROGER #55,\"1,234.56\"
";
        let rows = extract_rows(csv).unwrap();
        assert_eq!(rows[0].amount, 1234.56);
    }

    #[test]
    fn test_header_after_five_junk_rows() {
        let csv = "\
Account summary,,
As of 01/31/2026,,
,,
Total credits,\"2,500.00\",
Total debits,-95.67,
Date,Description,Amount
01/14/2026,KROGER #123,-45.67
";
        let txns = finish_rows(extract_rows(csv).unwrap(), &rules(), target());
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].amount, -45.67);
    }

    #[test]
    fn test_unrecognized_format_is_descriptive() {
        let csv = "Foo,Bar\n1,2\n";
        let err = extract_rows(csv).unwrap_err();
        assert!(err.to_string().contains("unrecognized CSV format"));
    }

    #[test]
    fn test_balance_layout_wins_over_generic() {
        // has date/description/amount too, but the balance column decides
        let csv = "\
Date,Description,Amount,Running Bal.
01/14/2026,KROGER #123,-45.67,100.00
";
        let names = header_names(
            csv::ReaderBuilder::new()
                .from_reader(csv.as_bytes())
                .headers()
                .unwrap(),
        );
        assert_eq!(sniff(&names), Some(Layout::Balance));
    }

    #[test]
    fn test_load_from_disk() {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(f, "Date,Description,Amount\n01/14/2026,KROGER #123,-45.67\n").unwrap();
        let txns = load_csv_statement(f.path(), &rules(), target()).unwrap();
        assert_eq!(txns.len(), 1);
    }
}
