//! The `report` subcommand: scan a statements directory, build the monthly
//! workbook, archive the transactions, and optionally email the result.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use spendscope_core::{CategoryList, MonthTarget, RuleSet, Transaction};
use spendscope_ingest::load_statement;
use spendscope_report::{build_report, html, write_workbook};

use crate::archive::TransactionArchive;
use crate::config::load_config;
use crate::metrics::RunMetrics;
use crate::prompts::{parse_selection, prompt};

pub struct ReportArgs {
    pub dir: Option<PathBuf>,
    pub files: Option<String>,
    pub month: Option<String>,
    pub out: Option<PathBuf>,
    pub send_email: bool,
    pub rules: Option<PathBuf>,
}

/// Statement files in `dir`: `.csv` and `.pdf`, case-insensitive on the
/// extension, sorted by name.
fn scan_statements(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if matches!(ext.as_deref(), Some("csv") | Some("pdf")) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn resolve_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match arg {
        Some(d) => d,
        None => PathBuf::from(prompt("Statements directory: ")?),
    };
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    Ok(dir)
}

fn resolve_month(arg: Option<String>) -> Result<MonthTarget> {
    let raw = match arg {
        Some(m) => m,
        None => prompt("Report month (MM/YYYY): ")?,
    };
    MonthTarget::parse(&raw)
}

fn select_files(files: Vec<PathBuf>, arg: Option<String>) -> Result<Vec<PathBuf>> {
    let selection = match arg {
        Some(s) => s,
        None => {
            println!("Found {} statement file(s):", files.len());
            for (i, f) in files.iter().enumerate() {
                println!("  {}. {}", i + 1, f.display());
            }
            prompt("Select files (e.g. 1,3 or all): ")?
        }
    };
    let picks = parse_selection(&selection, files.len());
    Ok(picks.into_iter().map(|i| files[i].clone()).collect())
}

pub async fn run_report(args: ReportArgs) -> Result<()> {
    let dir = resolve_dir(args.dir)?;
    let target = resolve_month(args.month)?;

    let files = scan_statements(&dir)?;
    if files.is_empty() {
        bail!("no .csv or .pdf statements in {}", dir.display());
    }
    let files = select_files(files, args.files)?;

    let rules_path = args
        .rules
        .unwrap_or_else(|| PathBuf::from("category_rules.csv"));
    let rules = RuleSet::load_or_default(&rules_path);
    let categories = CategoryList::load_or_builtin("categories.csv");

    let mut txns: Vec<Transaction> = Vec::new();
    for file in &files {
        match load_statement(file, &rules, target) {
            Ok(mut rows) => {
                println!("  {} -> {} transactions", file.display(), rows.len());
                txns.append(&mut rows);
            }
            Err(e) => {
                eprintln!("Skipping {}: {e:#}", file.display());
            }
        }
    }
    if txns.is_empty() {
        bail!("No valid transactions found for {}", target.label());
    }

    // Re-trace classifications for the metrics snapshot. The categories on
    // the transactions themselves are already final.
    let mut metrics = RunMetrics::new();
    metrics.start_categorization();
    for tx in &txns {
        let m = rules.classify_traced(&tx.vendor);
        metrics.record_classification(&tx.vendor, &m);
    }
    metrics.finish_categorization();

    let report = build_report(&txns, &categories.display_order(), target);

    let out = args.out.unwrap_or_else(|| {
        PathBuf::from(format!("Spending_Report_{}.xlsx", target.file_stamp()))
    });
    write_workbook(&out, &report)?;
    println!("\nWrote {}", out.display());

    let archive = TransactionArchive::open_default()?;
    let archived = archive.store_month(&target.archive_key(), &txns)?;
    println!("Archived {archived} transactions for {}", target.label());

    print_console_summary(&report);

    match crate::home::logs_dir().and_then(|d| metrics.save(&d)) {
        Ok(p) => println!("Metrics written to {}", p.display()),
        Err(e) => eprintln!("Warning: could not save metrics: {e:#}"),
    }

    if args.send_email {
        let cfg = load_config()?;
        let subject = format!("Spending Report {}", target.label());
        let body = html::email_body(&report);
        if let Err(e) =
            crate::gmail::send_report(&cfg.email.from, &cfg.email.to, &subject, &body, &out).await
        {
            eprintln!("Email not sent: {e:#}");
            eprintln!("The workbook is still available at {}", out.display());
        }
    }

    Ok(())
}

fn print_console_summary(report: &spendscope_report::SpendingReport) {
    println!("\nSpending summary for {}:", report.target.label());
    for share in &report.shares {
        println!(
            "  {:<30} ${:>10.2}  {:>6.2}%",
            share.category,
            share.total.abs(),
            share.percent
        );
    }
    println!("  {:<30} ${:>10.2}", "TOTAL", report.grand_total.abs());
    if !report.large.is_empty() {
        println!("  {} large transaction(s) over $200", report.large.len());
    }
}
