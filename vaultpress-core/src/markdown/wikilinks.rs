//! Wikilink resolution for [[target]] and [[target|text]] syntax.

use crate::models::{ParsedDocument, PublishedIndex};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn wikilink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The optional leading `!` lets image embeds match so they can be skipped.
    RE.get_or_init(|| {
        Regex::new(r"(!?)\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").expect("valid regex")
    })
}

/// Rewriter turning wikilinks into anchors to published posts
pub struct WikilinkTransformer<'a> {
    index: &'a PublishedIndex<'a>,
}

impl<'a> WikilinkTransformer<'a> {
    pub fn new(index: &'a PublishedIndex<'a>) -> Self {
        Self { index }
    }

    /// Resolve every wikilink in `content`.
    ///
    /// Links to published documents become `<a href="/posts/<slug>">`; any
    /// other target is downgraded to its display text with one warning.
    /// Returns (rewritten_content, warnings).
    pub fn transform(&self, content: &str, current: &ParsedDocument) -> (String, Vec<String>) {
        let mut warnings = Vec::new();

        let rewritten = wikilink_regex().replace_all(content, |caps: &Captures| {
            if !caps[1].is_empty() {
                return caps[0].to_string();
            }

            let target = &caps[2];
            let display = caps.get(3).map_or(target, |m| m.as_str());

            match self.index.get(target) {
                Some(doc) => format!(r#"<a href="/posts/{}">{}</a>"#, doc.slug, display),
                None => {
                    warnings.push(format!(
                        "[{}] Link target \"{}\" is not a published document.",
                        current.title, target
                    ));
                    display.to_string()
                }
            }
        });

        (rewritten.into_owned(), warnings)
    }
}
