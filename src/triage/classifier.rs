//! Keyword classifier for inbound messages.
//!
//! Rules are checked top-down and the first one with a matching keyword wins.
//! Matching is a substring test against the lowercased message.

use crate::base::types::{Category, Classification, Flag};

/// A single classifier rule: any keyword selects the outcome.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub outcome: Classification,
}

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

const fn outcome(category: Category, alert: Flag, auto_reply: Flag) -> Classification {
    Classification { category, alert, auto_reply }
}

/// The rule table, in priority order. Keywords must be lowercase.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["営業時間", "何時から", "場所", "どこ", "アクセス"],
        outcome: outcome(Category::StoreInfo, Flag::No, Flag::Yes),
    },
    Rule {
        keywords: &["vip", "シャンパン"],
        outcome: outcome(Category::Vip, Flag::Yes, Flag::No),
    },
    Rule {
        keywords: &["落とし物", "忘れ物"],
        outcome: outcome(Category::LostItem, Flag::No, Flag::Yes),
    },
    Rule {
        keywords: &["求人", "バイト", "仕事"],
        outcome: outcome(Category::JobInquiry, Flag::No, Flag::Yes),
    },
];

/// Outcome when no rule matches.
pub const FALLBACK: Classification = outcome(Category::Other, Flag::No, Flag::Yes);

/// Classify a message into its typed outcome.
pub fn classify_typed(text: &str) -> Classification {
    let text = text.to_lowercase();

    RULES.iter().find(|r| r.matches(&text)).map(|r| r.outcome).unwrap_or(FALLBACK)
}

/// Classify a message, rendering the outcome as a `key: value` block.
pub fn classify(text: &str) -> String {
    classify_typed(text).to_block()
}
