//! Excel output: three sheets (`Report_1/2/3`) with the header and
//! subtotal-row fills the report has always used.

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;

use crate::builder::SpendingReport;

const HEADER_BLUE: u32 = 0x4F81BD;
const TOTAL_GREEN: u32 = 0xC6EFCE;
const COLUMN_WIDTH: f64 = 25.0;

struct Formats {
    header: Format,
    total: Format,
    wrap: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_BLUE))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            total: Format::new()
                .set_background_color(Color::RGB(TOTAL_GREEN))
                .set_bold()
                .set_text_wrap(),
            wrap: Format::new().set_text_wrap(),
        }
    }
}

fn write_header(sheet: &mut Worksheet, fmts: &Formats, headers: &[&str]) -> Result<()> {
    for (col, h) in headers.iter().enumerate() {
        sheet.write_with_format(0, col as u16, *h, &fmts.header)?;
    }
    for col in 0..headers.len() as u16 {
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    Ok(())
}

fn write_row(
    sheet: &mut Worksheet,
    fmts: &Formats,
    row: u32,
    cells: &[&str],
    is_total: bool,
) -> Result<()> {
    let fmt = if is_total { &fmts.total } else { &fmts.wrap };
    for (col, cell) in cells.iter().enumerate() {
        sheet.write_with_format(row, col as u16, *cell, fmt)?;
    }
    Ok(())
}

/// Write `Spending_Report_MM_YYYY.xlsx` at `path`.
pub fn write_workbook(path: impl AsRef<Path>, report: &SpendingReport) -> Result<()> {
    let path = path.as_ref();
    let fmts = Formats::new();
    let mut workbook = Workbook::new();

    // Report 1: category -> vendor totals
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Report_1")?;
        write_header(sheet, &fmts, &["Category", "Vendor", "Total"])?;
        let mut row = 1;
        for block in &report.blocks {
            write_row(sheet, &fmts, row, &[&block.category, "", ""], false)?;
            row += 1;
            for v in &block.vendors {
                write_row(sheet, &fmts, row, &["", &v.vendor, &format!("{:.2}", v.total)], false)?;
                row += 1;
            }
            write_row(
                sheet,
                &fmts,
                row,
                &["", "Category Total", &format!("{:.2}", block.total)],
                true,
            )?;
            row += 1;
            write_row(sheet, &fmts, row, &["", "", ""], false)?;
            row += 1;
        }
    }

    // Report 2: category percentages
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Report_2")?;
        write_header(sheet, &fmts, &["Category", "Total", "Percent"])?;
        let mut row = 1;
        for share in &report.shares {
            write_row(
                sheet,
                &fmts,
                row,
                &[
                    &share.category,
                    &format!("{:.2}", share.total),
                    &format!("{:.2}%", share.percent),
                ],
                false,
            )?;
            row += 1;
        }
        write_row(
            sheet,
            &fmts,
            row,
            &["Total", &format!("{:.2}", report.grand_total), "100.00%"],
            true,
        )?;
    }

    // Report 3: large transactions
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Report_3")?;
        write_header(sheet, &fmts, &["Date", "Category", "Vendor", "Amount"])?;
        for (i, tx) in report.large.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_with_format(row, 0, tx.date.as_str(), &fmts.wrap)?;
            sheet.write_with_format(row, 1, tx.category.as_str(), &fmts.wrap)?;
            sheet.write_with_format(row, 2, tx.vendor.as_str(), &fmts.wrap)?;
            sheet.write_number_with_format(row, 3, tx.amount, &fmts.wrap)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_report;
    use chrono::NaiveDate;
    use spendscope_core::{MonthTarget, Transaction};

    #[test]
    fn test_workbook_written_to_disk() {
        let txns = vec![
            Transaction {
                date: "01/14/2026".to_string(),
                parsed_date: NaiveDate::from_ymd_opt(2026, 1, 14).unwrap(),
                description: "KROGER #123 ATLANTA GA".to_string(),
                vendor: "KROGER".to_string(),
                category: "Groceries & Markets".to_string(),
                amount: -45.67,
            },
            Transaction {
                date: "01/20/2026".to_string(),
                parsed_date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
                description: "BIG PURCHASE OUTLET".to_string(),
                vendor: "BIG PURCHASE".to_string(),
                category: "Shopping & Retail".to_string(),
                amount: -250.00,
            },
        ];
        let order = vec![
            "Groceries & Markets".to_string(),
            "Shopping & Retail".to_string(),
        ];
        let report = build_report(&txns, &order, MonthTarget::parse("01/2026").unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Spending_Report_01_2026.xlsx");
        write_workbook(&path, &report).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
