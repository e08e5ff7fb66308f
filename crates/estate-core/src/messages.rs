//! User-facing message derivation
//!
//! A small ordered rule table over the lower-cased technical message. The
//! first rule with a matching token wins; when nothing matches, the
//! category's canned sentence is used.

use crate::record::ErrorCategory;

struct MessageRule {
    tokens: &'static [&'static str],
    sentence: &'static str,
}

const RULES: &[MessageRule] = &[
    MessageRule {
        tokens: &["network", "fetch", "timeout"],
        sentence: "Unable to connect. Please check your internet connection and try again.",
    },
    MessageRule {
        tokens: &["wallet", "metamask"],
        sentence: "There was a problem with your wallet. Make sure it is unlocked and connected, then try again.",
    },
    MessageRule {
        tokens: &["permission", "denied"],
        sentence: "Permission was denied. Please allow access and try again.",
    },
    MessageRule {
        tokens: &["validation", "invalid"],
        sentence: "Some of the information provided is invalid. Please check it and try again.",
    },
    MessageRule {
        tokens: &["ar", "webxr", "vr"],
        sentence: "AR features are not available on this device or browser.",
    },
];

/// Canned sentence for a category.
#[must_use]
pub fn category_message(category: ErrorCategory) -> &'static str {
    match category {
        ErrorCategory::WalletChain => {
            "A wallet or blockchain error occurred. Please check your wallet and network settings."
        }
        ErrorCategory::Network => "A network error occurred. Please try again in a moment.",
        ErrorCategory::AugmentedReality => "Augmented reality is not supported on this device.",
        ErrorCategory::Validation => "Please check your input and try again.",
        ErrorCategory::Ui => {
            "Something went wrong while displaying this content. Please refresh the page."
        }
        ErrorCategory::Authentication => {
            "We could not verify your identity. Please sign in again."
        }
        ErrorCategory::Permission => "You do not have permission to perform this action.",
        ErrorCategory::Resource => {
            "A required resource could not be loaded. Please try again later."
        }
        ErrorCategory::Unknown => "An unexpected error occurred. Please try again.",
    }
}

/// Translate a technical message into a sentence suitable for end users.
#[must_use]
pub fn user_friendly_message(message: &str, category: ErrorCategory) -> String {
    let lower = message.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.tokens.iter().any(|t| lower.contains(t)))
        .map_or_else(
            || category_message(category).to_string(),
            |rule| rule.sentence.to_string(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_rule() {
        let msg = user_friendly_message("Network request failed", ErrorCategory::Unknown);
        assert!(msg.starts_with("Unable to connect"));
    }

    #[test]
    fn test_first_match_wins() {
        // Both "network" and "wallet" tokens present; network rule is first.
        let msg = user_friendly_message("wallet network unreachable", ErrorCategory::WalletChain);
        assert!(msg.starts_with("Unable to connect"));
    }

    #[test]
    fn test_metamask_is_wallet() {
        let msg = user_friendly_message("MetaMask is locked", ErrorCategory::Unknown);
        assert!(msg.contains("wallet"));
    }

    #[test]
    fn test_xr_tokens_match_inside_words() {
        for message in ["WebVR display not found", "ARKit session unavailable"] {
            let msg = user_friendly_message(message, ErrorCategory::Unknown);
            assert!(msg.starts_with("AR features"), "{message}");
        }
    }

    #[test]
    fn test_rules_are_plain_substrings() {
        // "ar" inside "parse" still selects the AR sentence.
        let msg = user_friendly_message("failed to parse", ErrorCategory::Ui);
        assert!(msg.starts_with("AR features"));
    }

    #[test]
    fn test_category_fallback() {
        for category in ErrorCategory::ALL {
            assert_eq!(
                user_friendly_message("boom", category),
                category_message(category)
            );
        }
    }
}
