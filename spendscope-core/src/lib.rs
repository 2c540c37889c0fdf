//! spendscope-core: transaction model, vendor normalization, and the
//! priority-ordered category rule engine.

pub mod categories;
pub mod dates;
pub mod filter;
pub mod normalize;
pub mod rules;
pub mod types;

pub use categories::{CategoryDef, CategoryList};
pub use dates::{parse_date_flex, MonthTarget};
pub use filter::is_income_or_transfer;
pub use normalize::normalize_vendor;
pub use rules::{Rule, RuleMatch, RuleSet, DEFAULT_CATEGORY};
pub use types::Transaction;
