//! Keyword rules behind the scripted assistant.
//!
//! This is substring matching, not language understanding. Rule order and the
//! fallback reply are the whole behaviour and must stay exactly as listed.

/// A substring to look for and the reply it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    /// Lowercase substring matched against the lowercased input.
    pub keyword: &'static str,
    /// Reply sent when the keyword matches.
    pub reply: &'static str,
}

/// Rules in priority order. The first match wins.
pub const KEYWORD_RULES: [KeywordRule; 3] = [
    KeywordRule {
        keyword: "sell",
        reply: "Just use our form above, and we'll guide you through selling your license.",
    },
    KeywordRule {
        keyword: "paid",
        reply: "Payment is made within 24 hours of offer acceptance.",
    },
    KeywordRule {
        keyword: "safe",
        reply: "Your data is encrypted and never shared.",
    },
];

/// Reply used when no rule matches.
pub const FALLBACK_REPLY: &str = "I'm sorry, I don't understand.";

/// Pick the reply for a user message.
#[must_use]
pub fn classify(text: &str) -> &'static str {
    matching_rule(text).map_or(FALLBACK_REPLY, |rule| rule.reply)
}

/// The first rule whose keyword occurs in `text`, ignoring case.
#[must_use]
pub fn matching_rule(text: &str) -> Option<&'static KeywordRule> {
    let lowered = text.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|rule| lowered.contains(rule.keyword))
}
