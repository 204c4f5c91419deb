//! Frontmatter parsing from vault notes and regeneration for output posts.

use crate::markdown::callouts::extract_summary_from_callout;
use crate::models::PublishableDocument;
use crate::timestamp::format_local_datetime;
use chrono::NaiveDateTime;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter is not a key-value mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .expect("valid regex")
    })
}

/// Open key-value metadata block from the top of a document.
///
/// Key order is preserved so that a document can be re-emitted with its
/// fields in the order the author wrote them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter(Mapping);

impl Frontmatter {
    pub fn new(mapping: Mapping) -> Self {
        Self(mapping)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(Value::String(key.to_string()), value.into());
    }

    /// Remove a key, keeping the remaining keys in order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn mapping(&self) -> &Mapping {
        &self.0
    }

    /// Scalar field rendered as a string (strings, numbers and booleans).
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_to_string)
    }

    /// List field; a lone scalar is treated as a one-element list.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            Value::Sequence(items) => Some(items.iter().filter_map(scalar_to_string).collect()),
            Value::Null => None,
            other => scalar_to_string(other).map(|s| vec![s]),
        }
    }

    pub fn title(&self) -> Option<String> {
        self.string("title")
    }

    pub fn tags(&self) -> Option<Vec<String>> {
        self.list("tags")
    }

    pub fn aliases(&self) -> Option<Vec<String>> {
        self.list("aliases")
    }

    pub fn summary(&self) -> Option<String> {
        self.string("summary")
    }

    pub fn lang(&self) -> Option<String> {
        self.string("lang").filter(|l| !l.is_empty())
    }

    /// `publish: true` or `publish: "true"`; nothing else counts.
    pub fn is_published(&self) -> bool {
        match self.get("publish") {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(s)) => s == "true",
            _ => false,
        }
    }
}

/// Parse frontmatter from markdown content
///
/// Returns a tuple of (frontmatter, markdown_body).
/// If no frontmatter is present, returns empty frontmatter with the full content as body.
///
/// # Example
///
/// ```
/// use vaultpress_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\npublish: true\n---\n# Hello World\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title(), Some("My Post".to_string()));
/// assert!(fm.is_published());
/// assert!(body.starts_with("# Hello World"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let mapping = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    Ok((Frontmatter(mapping), body.to_string()))
}

/// Drop every tag that appears in the exclusion list, keeping order.
pub fn filter_excluded_tags(tags: &[String], exclude: Option<&[String]>) -> Vec<String> {
    match exclude {
        Some(exclude) if !exclude.is_empty() => tags
            .iter()
            .filter(|tag| !exclude.contains(tag))
            .cloned()
            .collect(),
        _ => tags.to_vec(),
    }
}

/// Build the metadata block for a synced post.
///
/// `synced_at` becomes `publish_sync_at`; the next sync run parses it back to
/// decide whether the source changed since.
pub fn generate_frontmatter(
    doc: &PublishableDocument,
    exclude_tags: Option<&[String]>,
    synced_at: &NaiveDateTime,
) -> String {
    let fm = &doc.document.frontmatter;
    let mut lines = vec![
        format!("title: {}", format_yaml_string(&doc.document.title)),
        format!("date: {}", doc.document.date.format("%Y-%m-%d")),
        "publish: true".to_string(),
        format!("publish_sync_at: \"{}\"", format_local_datetime(synced_at)),
    ];

    if let Some(tags) = fm.tags().filter(|t| !t.is_empty()) {
        let tags = filter_excluded_tags(&tags, exclude_tags);
        if !tags.is_empty() {
            push_list(&mut lines, "tags", &tags);
        }
    }

    let summary = fm
        .summary()
        .or_else(|| extract_summary_from_callout(&doc.document.content));
    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        lines.push(format!("summary: \"{}\"", escape_double_quoted(&summary)));
    }

    if let Some(aliases) = fm.aliases() {
        push_list(&mut lines, "aliases", &aliases);
    }

    format!("---\n{}\n---", lines.join("\n"))
}

/// Quote a YAML scalar only when it would not survive as a plain scalar.
pub fn format_yaml_string(value: &str) -> String {
    const SPECIAL: &[char] = &[
        '\n', '\r', '"', ':', '#', '{', '}', '[', ']', '&', '*', '!', '|', '>', '\'', '%', '@',
        '`',
    ];

    if value.contains(SPECIAL) || value.chars().count() > 80 || !survives_as_plain(value) {
        format!("\"{}\"", escape_double_quoted(value))
    } else {
        value.to_string()
    }
}

/// A plain scalar must parse back to the same string: `- x`, `? x`, `null`,
/// `~`, `true`, numbers and padded values do not.
fn survives_as_plain(value: &str) -> bool {
    if value.starts_with(['-', '?', ',']) || value.starts_with(char::is_whitespace) {
        return false;
    }
    if value.ends_with(char::is_whitespace) {
        return false;
    }
    matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(s)) if s == value)
}

/// Render a mapping one key per line, in insertion order.
///
/// Lists become `key:` followed by `  - item` lines, strings go through
/// [`format_yaml_string`], and nested structures fall back to serde_yaml.
pub fn render_mapping(mapping: &Mapping) -> String {
    let mut lines = Vec::new();

    for (key, value) in mapping {
        let Some(key) = scalar_to_string(key) else {
            continue;
        };

        match value {
            Value::Null => {}
            Value::String(s) => lines.push(format!("{key}: {}", format_yaml_string(s))),
            Value::Bool(_) | Value::Number(_) => {
                if let Some(s) = scalar_to_string(value) {
                    lines.push(format!("{key}: {s}"));
                }
            }
            Value::Sequence(items) if items.iter().all(is_scalar) => {
                let items: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
                push_list(&mut lines, &key, &items);
            }
            nested => match serde_yaml::to_string(nested) {
                Ok(yaml) => {
                    lines.push(format!("{key}:"));
                    lines.extend(yaml.trim_end().lines().map(|l| format!("  {l}")));
                }
                Err(err) => tracing::warn!("Skipping frontmatter key '{}': {}", key, err),
            },
        }
    }

    lines.join("\n")
}

fn push_list(lines: &mut Vec<String>, key: &str, items: &[String]) {
    if items.is_empty() {
        lines.push(format!("{key}: []"));
        return;
    }
    lines.push(format!("{key}:"));
    lines.extend(items.iter().map(|item| format!("  - {}", format_yaml_string(item))));
}

fn escape_double_quoted(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
