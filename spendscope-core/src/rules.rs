//! Priority-ordered category rules loaded from `category_rules.csv`.
//!
//! Rules are evaluated highest priority first; the first rule whose pattern
//! appears in the vendor name wins. Overrides carry no resolution logic of
//! their own: an overriding rule simply holds a higher priority, and
//! `override_rule_id` records the intent for display.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Category assigned when no rule matches.
pub const DEFAULT_CATEGORY: &str = "Shopping & Retail";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    pub priority: i32,
    /// Upper-cased on load; matched as a case-insensitive substring.
    pub vendor_pattern: String,
    pub category: String,
    pub explanation: String,
    pub override_rule_id: Option<String>,
    pub is_custom: bool,
    pub created: Option<NaiveDate>,
}

/// Outcome of a traced classification, including every rule that matched so
/// callers can observe conflicts without changing the result.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub category: String,
    /// Winning rule, None when the default category applied.
    pub rule_id: Option<String>,
    pub priority: Option<i32>,
    /// All matching rule ids, winner first.
    pub matched: Vec<String>,
}

/// Immutable rule list, sorted once on load.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Load rules from a CSV file. The caller decides how to treat failure;
    /// batch runs use [`RuleSet::load_or_default`] instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening rules file {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load rules, degrading to an empty set (everything classifies to the
    /// default category) with a warning when the file is missing or bad.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(&path) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("Warning: could not load category rules: {e:#}");
                eprintln!("All vendors will fall back to '{DEFAULT_CATEGORY}'.");
                Self::default()
            }
        }
    }

    /// Parse rules from any reader. Expected header:
    /// `RuleID,Priority,VendorPattern,Category,Explanation,OverrideRuleID,IsCustom,CreatedDate`
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers().context("reading rules header")?.clone();
        let idx = |name: &str| headers.iter().position(|h| h.trim() == name);

        let rule_id_col = idx("RuleID").context("rules file missing RuleID column")?;
        let priority_col = idx("Priority").context("rules file missing Priority column")?;
        let pattern_col = idx("VendorPattern").context("rules file missing VendorPattern column")?;
        let category_col = idx("Category").context("rules file missing Category column")?;
        let explanation_col = idx("Explanation");
        let override_col = idx("OverrideRuleID");
        let custom_col = idx("IsCustom");
        let created_col = idx("CreatedDate");

        let mut rules = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record.with_context(|| format!("rules row {}", i + 2))?;
            let field = |col: usize| record.get(col).unwrap_or("").trim();

            let rule_id = field(rule_id_col).to_uppercase();
            if rule_id.is_empty() {
                continue;
            }
            let priority: i32 = field(priority_col)
                .parse()
                .with_context(|| format!("rule {rule_id}: bad priority"))?;

            let override_id = override_col.map(|c| field(c).to_uppercase()).unwrap_or_default();
            let created = created_col
                .and_then(|c| NaiveDate::parse_from_str(field(c), "%Y-%m-%d").ok());

            rules.push(Rule {
                rule_id,
                priority,
                vendor_pattern: field(pattern_col).to_uppercase(),
                category: field(category_col).to_string(),
                explanation: explanation_col.map(|c| field(c).to_string()).unwrap_or_default(),
                override_rule_id: (!override_id.is_empty()).then_some(override_id),
                is_custom: custom_col.map(|c| field(c).eq_ignore_ascii_case("yes")).unwrap_or(false),
                created,
            });
        }

        // Priority descending; equal priorities break ties on rule_id so the
        // outcome never depends on file order.
        rules.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.rule_id.cmp(&b.rule_id)));
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category of the highest-priority rule whose pattern is contained in
    /// the vendor name, or the default category.
    pub fn classify(&self, vendor: &str) -> &str {
        let v = vendor.to_uppercase();
        self.rules
            .iter()
            .find(|r| !r.vendor_pattern.is_empty() && v.contains(&r.vendor_pattern))
            .map(|r| r.category.as_str())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Like [`classify`](Self::classify) but records every matching rule.
    /// More than one entry in `matched` is a conflict; the winner is still
    /// just the first.
    pub fn classify_traced(&self, vendor: &str) -> RuleMatch {
        let v = vendor.to_uppercase();
        let matched: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|r| !r.vendor_pattern.is_empty() && v.contains(&r.vendor_pattern))
            .collect();

        match matched.first() {
            Some(winner) => RuleMatch {
                category: winner.category.clone(),
                rule_id: Some(winner.rule_id.clone()),
                priority: Some(winner.priority),
                matched: matched.iter().map(|r| r.rule_id.clone()).collect(),
            },
            None => RuleMatch {
                category: DEFAULT_CATEGORY.to_string(),
                rule_id: None,
                priority: None,
                matched: Vec::new(),
            },
        }
    }

    /// Equal-priority rule pairs where one pattern contains the other, i.e.
    /// some vendor string would match both and only the rule_id tie-break
    /// decides. Surfaced by `spendscope rules check`.
    pub fn conflicts(&self) -> Vec<(&Rule, &Rule)> {
        let mut out = Vec::new();
        for (i, a) in self.rules.iter().enumerate() {
            for b in &self.rules[i + 1..] {
                if b.priority != a.priority {
                    break; // sorted by priority, no later equal pairs
                }
                if a.vendor_pattern.contains(&b.vendor_pattern)
                    || b.vendor_pattern.contains(&a.vendor_pattern)
                {
                    out.push((a, b));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "\
RuleID,Priority,VendorPattern,Category,Explanation,OverrideRuleID,IsCustom,CreatedDate
G001,50,KROGER,Groceries & Markets,Kroger grocery stores,,No,2026-01-01
A002,100,KROGER FUEL,Auto & Gas,Fuel centers are gas not groceries,G001,No,2026-01-01
R001,50,TACO BELL,Restaurants & Food,Fast food,,No,2026-01-01
U001,60,SHELL,Utilities Bills & Insurance,Tie-break probe,,Yes,2026-01-05
A001,60,SHELL,Auto & Gas,Gas stations,,No,2026-01-01
";

    fn fixture() -> RuleSet {
        RuleSet::from_reader(FIXTURE.as_bytes()).unwrap()
    }

    #[test]
    fn test_priority_order_wins() {
        let rules = fixture();
        assert_eq!(rules.classify("KROGER"), "Groceries & Markets");
        assert_eq!(rules.classify("KROGER FUEL CENTER"), "Auto & Gas");
        assert_eq!(rules.classify("kroger #123"), "Groceries & Markets");
    }

    #[test]
    fn test_default_category() {
        let rules = fixture();
        assert_eq!(rules.classify("RANDOM VENDOR"), DEFAULT_CATEGORY);
        assert_eq!(RuleSet::default().classify("KROGER"), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_equal_priority_ties_break_on_rule_id() {
        // A001 and U001 both match SHELL at priority 60; A001 sorts first.
        let rules = fixture();
        let m = rules.classify_traced("SHELL OIL 5744");
        assert_eq!(m.category, "Auto & Gas");
        assert_eq!(m.rule_id.as_deref(), Some("A001"));
        assert_eq!(m.matched, vec!["A001", "U001"]);
    }

    #[test]
    fn test_traced_conflict_reporting() {
        let rules = fixture();
        let m = rules.classify_traced("KROGER FUEL CENTER");
        // winner first, then the overridden grocery rule
        assert_eq!(m.matched, vec!["A002", "G001"]);
        assert_eq!(m.priority, Some(100));

        let none = rules.classify_traced("RANDOM VENDOR");
        assert!(none.matched.is_empty());
        assert_eq!(none.rule_id, None);
    }

    #[test]
    fn test_static_conflict_scan() {
        let rules = fixture();
        let conflicts = rules.conflicts();
        assert_eq!(conflicts.len(), 1);
        let (a, b) = conflicts[0];
        assert_eq!(a.priority, b.priority);
        assert_eq!(a.vendor_pattern, "SHELL");
    }

    #[test]
    fn test_override_is_informational() {
        let rules = fixture();
        let fuel = rules.rules().iter().find(|r| r.rule_id == "A002").unwrap();
        assert_eq!(fuel.override_rule_id.as_deref(), Some("G001"));
        // removing the override id would not change classification
        assert_eq!(rules.classify("KROGER FUEL"), "Auto & Gas");
    }

    #[test]
    fn test_missing_file_degrades_to_default() {
        let rules = RuleSet::load_or_default("/nonexistent/category_rules.csv");
        assert!(rules.is_empty());
        assert_eq!(rules.classify("KROGER"), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_malformed_priority_is_an_error() {
        let bad = "RuleID,Priority,VendorPattern,Category\nX001,not-a-number,KROGER,Groceries\n";
        assert!(RuleSet::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_optional_columns_absent() {
        let minimal = "RuleID,Priority,VendorPattern,Category\nG001,50,KROGER,Groceries & Markets\n";
        let rules = RuleSet::from_reader(minimal.as_bytes()).unwrap();
        assert_eq!(rules.len(), 1);
        let r = &rules.rules()[0];
        assert_eq!(r.override_rule_id, None);
        assert!(!r.is_custom);
        assert_eq!(rules.classify("KROGER #44"), "Groceries & Markets");
    }
}
