//! PDF credit card statement parser.
//!
//! Expected extracted-text shape (transaction section):
//!
//!   Standard Purchases
//!   01/13 01/14 KROGER #123 ATLANTA GA          $45.67
//!   01/20 01/21 SHELL OIL 5744                  $38.20
//!   Fees Charged
//!
//! Only lines between a section-start marker and an end marker are
//! considered; everything on a statement is a charge, so amounts are forced
//! negative. The post date (second column) is kept.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use spendscope_core::{MonthTarget, RuleSet, Transaction};

use crate::pipeline::{finish_rows, RawRow};

const SECTION_END_MARKERS: &[&str] = &[
    "fees charged",
    "interest charged",
    "earned this period",
    "cardholder summary",
];

static TXN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2}/\d{2})\s+(\d{2}/\d{2})\s+(.+?)\s+(\$[\d,\.]+)").expect("txn regex")
});

fn is_section_start(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("standard purchases") || (lower.contains("year to date") && line.contains(':'))
}

fn is_section_end(line: &str) -> bool {
    let lower = line.to_lowercase();
    SECTION_END_MARKERS.iter().any(|m| lower.contains(m))
}

/// Scrape transaction rows out of extracted statement text.
/// Errors when the text yields no transactions at all.
pub fn scrape_statement_text(text: &str) -> Result<Vec<RawRow>> {
    let mut in_section = false;
    let mut rows = Vec::new();

    for line in text.lines() {
        if is_section_start(line) {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if is_section_end(line) {
            in_section = false;
            continue;
        }
        // header echoes and percentage/summary lines
        if line.trim().is_empty() || line.to_lowercase().contains("date") || line.contains('%') {
            continue;
        }

        if let Some(caps) = TXN_RE.captures(line) {
            let post_date = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let description = caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
            let amount_str = caps.get(4).map(|m| m.as_str()).unwrap_or_default();

            let Ok(amount) = amount_str.replace(['$', ','], "").parse::<f64>() else {
                continue;
            };

            rows.push(RawRow {
                date: post_date.to_string(),
                description: description.to_string(),
                // statements list charges unsigned
                amount: -amount.abs(),
            });
        }
    }

    if rows.is_empty() {
        bail!("no transactions found in PDF text");
    }
    Ok(rows)
}

/// Extract text from a PDF statement and scrape its transaction section,
/// restricted to the target month.
pub fn load_pdf_statement(
    path: impl AsRef<Path>,
    rules: &RuleSet,
    target: MonthTarget,
) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let text = pdf_extract::extract_text(path)
        .with_context(|| format!("extracting text from {}", path.display()))?;
    let rows =
        scrape_statement_text(&text).with_context(|| format!("in file {}", path.display()))?;
    Ok(finish_rows(rows, rules, target))
}
