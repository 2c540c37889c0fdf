//! Income and transfer exclusion.
//!
//! Spending reports only care about outgoing purchases; payroll deposits,
//! card autopays, and inter-account transfers would otherwise cancel out or
//! inflate categories.

const INCOME_TRANSFER_KEYWORDS: &[&str] = &[
    "PAYROLL",
    "ZELLE PAYMENT FROM",
    "TRANSFER",
    "OVERDRAFT PROTECTION",
    "DEPOSIT",
    "CREDIT CARD BILL PAYMENT",
    "CITI AUTOPAY",
    "AUTOPAY",
    "ONLINE BANKING PAYMENT",
    "ONLINE PAYMENT",
    "ONLINE BANKING PAYMENT TO CRD",
    "BANK OF AMERICA CREDIT CARD BILL PAYMENT",
    "BA ELECTRONIC PAYMENT",
    "FID BKG SVC",
    "BEGINNING BALANCE",
];

/// True when the raw description matches any of the fixed keyword list
/// (case-insensitive containment).
pub fn is_income_or_transfer(description: &str) -> bool {
    let d = description.to_uppercase();
    INCOME_TRANSFER_KEYWORDS.iter().any(|k| d.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excludes_payroll_and_transfers() {
        assert!(is_income_or_transfer("ACME CORP PAYROLL 0142"));
        assert!(is_income_or_transfer("Online Banking payment to CRD 9923"));
        assert!(is_income_or_transfer("zelle payment from JANE DOE"));
        assert!(is_income_or_transfer("CITI AUTOPAY PAYMENT"));
        assert!(is_income_or_transfer("Beginning balance as of 01/01"));
    }

    #[test]
    fn test_keeps_purchases() {
        assert!(!is_income_or_transfer("KROGER #123 ATLANTA GA"));
        assert!(!is_income_or_transfer("SHELL OIL 5744"));
        assert!(!is_income_or_transfer(""));
    }
}
