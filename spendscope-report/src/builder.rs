//! Aggregates the uniform transaction table into the three report
//! projections: category→vendor totals, category percentages, and large
//! transactions.

use std::collections::HashMap;

use spendscope_core::{MonthTarget, Transaction};

/// Transactions above this absolute amount land in the large-transaction
/// sheet. Strictly greater: $200.00 exactly stays out.
pub const LARGE_TXN_THRESHOLD: f64 = 200.0;

#[derive(Debug, Clone, PartialEq)]
pub struct VendorTotal {
    pub vendor: String,
    pub total: f64,
}

/// One category's section in the vendor-totals report.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBlock {
    pub category: String,
    pub vendors: Vec<VendorTotal>,
    pub total: f64,
}

/// One row of the percentage report.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone)]
pub struct SpendingReport {
    pub target: MonthTarget,
    /// Report 1: per-category vendor totals, in display order.
    pub blocks: Vec<CategoryBlock>,
    /// Report 2: category totals as share of the grand total.
    pub shares: Vec<CategoryShare>,
    pub grand_total: f64,
    /// Report 3: abs(amount) > threshold, date ascending.
    pub large: Vec<Transaction>,
}

impl SpendingReport {
    pub fn transaction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.vendors.len()).sum()
    }
}

/// Build all three projections. `category_order` fixes the display order;
/// categories with no transactions are omitted. Categories present in the
/// data but absent from the order list are appended at the end so nothing
/// silently disappears.
pub fn build_report(
    txns: &[Transaction],
    category_order: &[String],
    target: MonthTarget,
) -> SpendingReport {
    // category -> vendor -> sum
    let mut by_category: HashMap<&str, HashMap<&str, f64>> = HashMap::new();
    for tx in txns {
        *by_category
            .entry(tx.category.as_str())
            .or_default()
            .entry(tx.vendor.as_str())
            .or_default() += tx.amount;
    }

    let mut ordered: Vec<&str> = category_order
        .iter()
        .map(String::as_str)
        .filter(|c| by_category.contains_key(*c))
        .collect();
    let mut extras: Vec<&str> = by_category
        .keys()
        .copied()
        .filter(|c| !category_order.iter().any(|o| o == c))
        .collect();
    extras.sort_unstable();
    ordered.extend(extras);

    let mut blocks = Vec::new();
    for cat in &ordered {
        let vendors_map = &by_category[*cat];
        let mut vendors: Vec<VendorTotal> = vendors_map
            .iter()
            .map(|(vendor, total)| VendorTotal {
                vendor: (*vendor).to_string(),
                total: *total,
            })
            .collect();
        vendors.sort_by(|a, b| a.vendor.cmp(&b.vendor));
        let total = vendors.iter().map(|v| v.total).sum();
        blocks.push(CategoryBlock {
            category: (*cat).to_string(),
            vendors,
            total,
        });
    }

    let grand_total: f64 = blocks.iter().map(|b| b.total).sum();
    let shares = blocks
        .iter()
        .map(|b| CategoryShare {
            category: b.category.clone(),
            total: b.total,
            percent: if grand_total != 0.0 {
                b.total.abs() / grand_total.abs() * 100.0
            } else {
                0.0
            },
        })
        .collect();

    let mut large: Vec<Transaction> = txns
        .iter()
        .filter(|t| t.amount.abs() > LARGE_TXN_THRESHOLD)
        .cloned()
        .collect();
    large.sort_by_key(|t| t.parsed_date);

    SpendingReport {
        target,
        blocks,
        shares,
        grand_total,
        large,
    }
}
