//! spendscope-report: report projections, Excel workbook output, and HTML
//! rendering for email delivery.

pub mod builder;
pub mod excel;
pub mod html;

pub use builder::{build_report, CategoryBlock, CategoryShare, SpendingReport, LARGE_TXN_THRESHOLD};
pub use excel::write_workbook;
