//! End-to-end regression: statement files on disk through ingestion,
//! aggregation, and workbook output.

use std::io::Write;

use spendscope_core::{MonthTarget, RuleSet};
use spendscope_ingest::load_statement;
use spendscope_report::{build_report, write_workbook, LARGE_TXN_THRESHOLD};

const RULES: &str = "\
RuleID,Priority,VendorPattern,Category,Explanation,OverrideRuleID,IsCustom,CreatedDate
G001,50,KROGER,Groceries & Markets,groceries,,No,2026-01-01
A001,100,KROGER FUEL,Auto & Gas,fuel center,G001,No,2026-01-01
A002,50,SHELL,Auto & Gas,gas stations,,No,2026-01-01
";

const STATEMENT: &str = "\
Date,Description,Amount,Running Bal.
01/03/2026,KROGER #123 ATLANTA GA,-45.67,\"1,954.33\"
01/05/2026,KROGER FUEL CTR 992,-30.10,\"1,924.23\"
01/09/2026,SHELL OIL 5744,-38.00,\"1,886.23\"
01/12/2026,ACME CORP PAYROLL,\"2,500.00\",\"4,386.23\"
01/15/2026,BIG FURNITURE OUTLET,-450.00,\"3,936.23\"
02/02/2026,KROGER #123 ATLANTA GA,-12.00,\"3,924.23\"
";

fn order() -> Vec<String> {
    ["Groceries & Markets", "Auto & Gas", "Shopping & Retail"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_statement_to_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let statement = dir.path().join("checking.csv");
    let mut f = std::fs::File::create(&statement).unwrap();
    write!(f, "{STATEMENT}").unwrap();

    let rules = RuleSet::from_reader(RULES.as_bytes()).unwrap();
    let target = MonthTarget::parse("01/2026").unwrap();

    let txns = load_statement(&statement, &rules, target).unwrap();
    // payroll excluded, February row excluded
    assert_eq!(txns.len(), 4);

    let report = build_report(&txns, &order(), target);

    // Report 1: fuel center lands under Auto & Gas, not Groceries
    let auto = report
        .blocks
        .iter()
        .find(|b| b.category == "Auto & Gas")
        .unwrap();
    let vendors: Vec<&str> = auto.vendors.iter().map(|v| v.vendor.as_str()).collect();
    assert_eq!(vendors, vec!["KROGER FUEL", "SHELL"]);
    assert!((auto.total - (-68.10)).abs() < 1e-9);

    // Report 2: shares sum to 100
    let share_sum: f64 = report.shares.iter().map(|s| s.percent).sum();
    assert!((share_sum - 100.0).abs() < 1e-6);

    // Report 3: only the furniture purchase clears the threshold
    assert_eq!(report.large.len(), 1);
    assert_eq!(report.large[0].vendor, "BIG");
    assert!(report.large[0].amount.abs() > LARGE_TXN_THRESHOLD);

    let out = dir.path().join("Spending_Report_01_2026.xlsx");
    write_workbook(&out, &report).unwrap();
    assert!(out.metadata().unwrap().len() > 0);
}

#[test]
fn test_unknown_vendor_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let statement = dir.path().join("card.csv");
    std::fs::write(
        &statement,
        "Posted Date,Payee,Amount\n01/08/2026,MYSTERY SHOP 42,-19.99\n",
    )
    .unwrap();

    let rules = RuleSet::from_reader(RULES.as_bytes()).unwrap();
    let target = MonthTarget::parse("01/2026").unwrap();
    let txns = load_statement(&statement, &rules, target).unwrap();

    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].category, spendscope_core::DEFAULT_CATEGORY);

    let report = build_report(&txns, &order(), target);
    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.blocks[0].category, "Shopping & Retail");
    assert!((report.shares[0].percent - 100.0).abs() < 1e-9);
}
