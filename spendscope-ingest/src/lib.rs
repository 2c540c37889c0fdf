//! spendscope-ingest: statement loaders (CSV schema sniffing, PDF text
//! scraping) producing the uniform transaction table.

pub mod csv_statement;
pub mod pdf_statement;

mod pipeline;

use anyhow::Result;
use std::path::Path;

use spendscope_core::{MonthTarget, RuleSet, Transaction};

pub use pipeline::RawRow;

/// Load one statement file (`.csv` or `.pdf`), restricted to the target
/// month. Errors describe the single file; callers skip and continue.
pub fn load_statement(
    path: impl AsRef<Path>,
    rules: &RuleSet,
    target: MonthTarget,
) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    if is_pdf {
        pdf_statement::load_pdf_statement(path, rules, target)
    } else {
        csv_statement::load_csv_statement(path, rules, target)
    }
}
