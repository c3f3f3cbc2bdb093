//! Bridge mention rewriting for lobby chat.
//!
//! Bridge users are mentioned as `<@123>` (or `<@!123>` for nicknames). After
//! sanitization the brackets arrive escaped (`&lt;@123&gt;`), so both forms
//! are recognized. Known IDs become `@name`; unknown IDs are left as they are.

use fancy_regex::{Captures, Regex};

#[derive(Debug, Clone)]
pub struct MentionRewriter {
    mention_pattern: Regex,
}

impl Default for MentionRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MentionRewriter {
    pub fn new() -> Self {
        Self {
            mention_pattern: Regex::new(r"(?:<|&lt;)@!?(\d+)(?:>|&gt;)")
                .expect("mention pattern is valid"),
        }
    }

    /// Replace every resolvable mention with `@<display name>`.
    pub fn rewrite<F>(&self, text: &str, lookup: F) -> String
    where
        F: Fn(u64) -> Option<String>,
    {
        self.mention_pattern
            .replace_all(text, |caps: &Captures| -> String {
                caps[1]
                    .parse::<u64>()
                    .ok()
                    .and_then(&lookup)
                    .map(|name| format!("@{}", name))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .to_string()
    }
}
