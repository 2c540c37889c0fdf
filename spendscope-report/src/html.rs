//! HTML rendering of the summary tables for the email body.

use crate::builder::SpendingReport;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from("<table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\n<tr>");
    for h in headers {
        out.push_str(&format!("<th>{}</th>", escape(h)));
    }
    out.push_str("</tr>\n");
    for row in rows {
        out.push_str("<tr>");
        for cell in row {
            out.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>");
    out
}

/// Category summary (Report 2) as an HTML table.
pub fn shares_table(report: &SpendingReport) -> String {
    let mut rows: Vec<Vec<String>> = report
        .shares
        .iter()
        .map(|s| {
            vec![
                s.category.clone(),
                format!("{:.2}", s.total),
                format!("{:.2}%", s.percent),
            ]
        })
        .collect();
    rows.push(vec![
        "Total".to_string(),
        format!("{:.2}", report.grand_total),
        "100.00%".to_string(),
    ]);
    table(&["Category", "Total", "Percent"], &rows)
}

/// Large transactions (Report 3) as an HTML table.
pub fn large_transactions_table(report: &SpendingReport) -> String {
    let rows: Vec<Vec<String>> = report
        .large
        .iter()
        .map(|t| {
            vec![
                t.date.clone(),
                t.category.clone(),
                t.vendor.clone(),
                format!("{:.2}", t.amount),
            ]
        })
        .collect();
    table(&["Date", "Category", "Vendor", "Amount"], &rows)
}

/// Full email body.
pub fn email_body(report: &SpendingReport) -> String {
    format!(
        "<html>\n<body style=\"font-family: Arial, sans-serif;\">\n\
         <p>Hello,</p>\n\
         <p>Your spending report for <strong>{}</strong> is attached.</p>\n\
         <h3>Category Summary</h3>\n{}\n\
         <h3>Large Transactions (&gt; $200)</h3>\n{}\n\
         <p>Best regards,<br>Automated Report System</p>\n\
         </body>\n</html>\n",
        report.target.label(),
        shares_table(report),
        large_transactions_table(report),
    )
}
