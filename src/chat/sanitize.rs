//! Markup sanitization for user-supplied chat text.
//!
//! The strict policy allows no markup at all: every tag is removed, the bodies
//! of `<script>` and `<style>` elements are dropped entirely, and the
//! remaining HTML-significant characters are escaped as entities.

use fancy_regex::Regex;

/// Pure text transform applied to untrusted chat input.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, text: &str) -> String;
}

/// Sanitizer that strips all markup.
///
/// Neither pattern uses backreferences or lookaround, so both run on the
/// linear-time engine regardless of input length.
#[derive(Debug, Clone)]
pub struct StrictSanitizer {
    /// `<script>...</script>` and `<style>...</style>` including their bodies.
    block_pattern: Regex,
    /// Any remaining start/end tag, comment, or declaration.
    tag_pattern: Regex,
}

impl Default for StrictSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl StrictSanitizer {
    pub fn new() -> Self {
        Self {
            block_pattern: Regex::new(
                r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>",
            )
            .expect("block pattern is valid"),
            tag_pattern: Regex::new(r"(?s)<!--.*?-->|</?[a-zA-Z][^>]*>|<![^>]*>")
                .expect("tag pattern is valid"),
        }
    }
}

impl Sanitizer for StrictSanitizer {
    fn sanitize(&self, text: &str) -> String {
        let without_blocks = self.block_pattern.replace_all(text, "");
        let without_tags = self.tag_pattern.replace_all(&without_blocks, "");
        escape_html(&without_tags)
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
