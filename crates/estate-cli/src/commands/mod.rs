//! Subcommand handlers

pub mod classify;
pub mod config;
pub mod probe;
pub mod simulate;

use estate_core::ErrorCategory;

/// Parse a kebab-case category name for clap.
pub fn parse_category(value: &str) -> Result<ErrorCategory, String> {
    ErrorCategory::parse(value).ok_or_else(|| {
        let known: Vec<_> = ErrorCategory::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category '{value}' (expected one of: {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(
            parse_category("wallet-chain"),
            Ok(ErrorCategory::WalletChain)
        );
        let err = parse_category("wallet").unwrap_err();
        assert!(err.contains("augmented-reality"));
    }
}
