//! Slug generation for output filenames and URLs.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn hyphen_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("valid regex"))
}

fn whitespace_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Keep only ASCII letters/digits, Hangul syllables, whitespace and hyphens
/// - Replace whitespace runs with a single hyphen
/// - Collapse multiple hyphens
/// - Trim leading/trailing hyphens
///
/// Other scripts (Japanese, Cyrillic, ...) are dropped entirely, so a title
/// written only in them produces an empty slug.
///
/// # Examples
///
/// ```
/// use vaultpress_core::slugify;
///
/// assert_eq!(slugify("Hello! World?"), "hello-world");
/// assert_eq!(slugify("리액트 React 튜토리얼"), "리액트-react-튜토리얼");
/// assert_eq!(slugify("!@#$%"), "");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .chars()
        .filter(|&c| {
            c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || is_hangul_syllable(c)
                || c.is_whitespace()
                || c == '-'
        })
        .collect::<String>();

    let hyphenated = whitespace_run_regex().replace_all(&cleaned, "-");
    let collapsed = hyphen_run_regex().replace_all(&hyphenated, "-");

    collapsed.trim_matches('-').to_string()
}

/// Derive the slug for a source document.
///
/// The title wins when it is non-empty; otherwise the file name without its
/// extension is used.
pub fn generate_slug(file_path: &Path, title: Option<&str>) -> String {
    match title.filter(|t| !t.is_empty()) {
        Some(title) => slugify(title),
        None => slugify(&file_stem(file_path)),
    }
}

/// File name without the extension, or an empty string.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}
