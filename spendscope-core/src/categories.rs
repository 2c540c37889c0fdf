//! Category definitions and display order, loaded from `categories.csv`.
//!
//! The parent column is display grouping only; nothing in classification
//! depends on the hierarchy.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Built-in display order used when no categories file is available.
pub const BUILTIN_ORDER: &[&str] = &[
    "Groceries & Markets",
    "Restaurants & Food",
    "Shopping & Retail",
    "Auto & Gas",
    "Utilities Bills & Insurance",
    "Health",
    "Entertainment",
    "Home & Services",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub parent: Option<String>,
    pub description: String,
    pub user_defined: bool,
    pub created: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct CategoryList {
    categories: Vec<CategoryDef>,
}

impl CategoryList {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening categories file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))
    }

    /// Missing or malformed file falls back to the built-in list.
    pub fn load_or_builtin(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_else(|_| Self::builtin())
    }

    pub fn builtin() -> Self {
        let categories = BUILTIN_ORDER
            .iter()
            .map(|name| CategoryDef {
                name: (*name).to_string(),
                parent: None,
                description: String::new(),
                user_defined: false,
                created: None,
            })
            .collect();
        Self { categories }
    }

    /// Expected header:
    /// `CategoryName,ParentCategory,Description,IsUserDefined,CreatedDate`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers().context("reading categories header")?.clone();
        let idx = |name: &str| headers.iter().position(|h| h.trim() == name);

        let name_col = idx("CategoryName").context("categories file missing CategoryName")?;
        let parent_col = idx("ParentCategory");
        let desc_col = idx("Description");
        let user_col = idx("IsUserDefined");
        let created_col = idx("CreatedDate");

        let mut categories = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let field = |col: usize| record.get(col).unwrap_or("").trim();
            let name = field(name_col).to_string();
            if name.is_empty() {
                continue;
            }
            let parent = parent_col.map(|c| field(c).to_string()).unwrap_or_default();
            categories.push(CategoryDef {
                name,
                parent: (!parent.is_empty()).then_some(parent),
                description: desc_col.map(|c| field(c).to_string()).unwrap_or_default(),
                user_defined: user_col.map(|c| field(c).eq_ignore_ascii_case("yes")).unwrap_or(false),
                created: created_col
                    .and_then(|c| NaiveDate::parse_from_str(field(c), "%Y-%m-%d").ok()),
            });
        }
        Ok(Self { categories })
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    /// Display order for reports: file row order.
    pub fn display_order(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
