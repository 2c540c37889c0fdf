//! Statement date parsing and the report month window.

use anyhow::{bail, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The month a report run is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthTarget {
    pub month: u32,
    pub year: i32,
}

impl MonthTarget {
    /// Parse "MM/YYYY" (leading zero optional).
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.trim().split('/').collect();
        if parts.len() != 2 {
            bail!("invalid month '{input}': expected MM/YYYY");
        }
        let month: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid month '{input}': expected MM/YYYY"))?;
        let year: i32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid month '{input}': expected MM/YYYY"))?;
        if !(1..=12).contains(&month) {
            bail!("invalid month '{input}': month must be 1-12");
        }
        Ok(Self { month, year })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// "MM/YYYY" for display.
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }

    /// "MM_YYYY" for output filenames.
    pub fn file_stamp(&self) -> String {
        format!("{:02}_{}", self.month, self.year)
    }

    /// "YYYY-MM" archive key.
    pub fn archive_key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// Parse a statement date trying the known formats in order:
/// `MM/DD/YYYY`, `MM/DD/YY`, then `MM/DD` with `default_year` filled in.
pub fn parse_date_flex(raw: &str, default_year: i32) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%m/%d/%Y", "%m/%d/%y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    // MM/DD without a year (PDF post dates)
    let mut it = s.split('/');
    let m: u32 = it.next()?.trim().parse().ok()?;
    let d: u32 = it.next()?.trim().parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(default_year, m, d)
}
