//! Placeholder shielding for fenced and inline code.
//!
//! Every other rewriter runs on shielded text, so vault syntax that appears
//! inside code is never touched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

const OPEN: char = '\u{E000}';
const CLOSE: char = '\u{E001}';

fn fenced_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").expect("valid regex"))
}

fn inline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`[^`\n]+`").expect("valid regex"))
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("\u{E000}CODE(\\d+)\u{E001}").expect("valid regex"))
}

/// Text with its code spans swapped out for opaque tokens
#[derive(Debug, Clone)]
pub struct ShieldedText {
    pub text: String,
    spans: Vec<String>,
}

impl ShieldedText {
    /// Number of code spans that were shielded
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Put the original code back in place of each placeholder.
    pub fn restore(&self, text: &str) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|idx| self.spans.get(idx))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Replace fenced blocks, then inline code spans, with placeholders.
pub fn shield_code(content: &str) -> ShieldedText {
    let mut spans = Vec::new();

    let fenced = stash(fenced_regex(), content, &mut spans);
    let text = stash(inline_regex(), &fenced, &mut spans);

    ShieldedText { text, spans }
}

fn stash(re: &Regex, text: &str, spans: &mut Vec<String>) -> String {
    re.replace_all(text, |caps: &Captures| {
        let placeholder = format!("{OPEN}CODE{}{CLOSE}", spans.len());
        spans.push(caps[0].to_string());
        placeholder
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shields_fenced_and_inline() {
        let content = "before\n```rust\nlet x = [[a]];\n```\nuse `[[b]]` here";
        let shielded = shield_code(content);

        assert_eq!(shielded.span_count(), 2);
        assert!(!shielded.text.contains("[["));
        assert!(shielded.text.starts_with("before\n"));
        assert!(shielded.text.contains(" here"));
        assert_eq!(shielded.restore(&shielded.text), content);
    }

    #[test]
    fn test_inline_code_does_not_span_lines() {
        let content = "a `not\ncode` b";
        let shielded = shield_code(content);
        assert_eq!(shielded.span_count(), 0);
        assert_eq!(shielded.text, content);
    }

    #[test]
    fn test_restore_survives_surrounding_rewrites() {
        let shielded = shield_code("x `$1 and $&` y");
        let rewritten = format!("<p>{}</p>", shielded.text);
        assert_eq!(shielded.restore(&rewritten), "<p>x `$1 and $&` y</p>");
    }

    #[test]
    fn test_many_spans_keep_their_identity() {
        let content: String = (0..12).map(|i| format!("`c{i}` ")).collect();
        let shielded = shield_code(&content);
        assert_eq!(shielded.span_count(), 12);
        assert_eq!(shielded.restore(&shielded.text), content);
    }
}
