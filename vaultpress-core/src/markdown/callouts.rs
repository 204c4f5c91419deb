//! Callout blocks authored as `> [!TYPE] Title` blockquotes.
//!
//! A marker line opens a callout; following `>` lines form its body until a
//! non-quoted line or the next marker. Callouts never nest.

use regex::Regex;
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^>\s*\[!([A-Za-z0-9_]+)\](?:\s+(.*))?$").expect("valid regex")
    })
}

/// A `> [!TYPE] Title` marker line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Marker {
    kind: String,
    title: Option<String>,
}

fn parse_marker(line: &str) -> Option<Marker> {
    let caps = marker_regex().captures(line)?;
    Some(Marker {
        kind: caps[1].to_lowercase(),
        title: caps
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|t| !t.is_empty()),
    })
}

fn quoted_body(line: &str) -> Option<&str> {
    line.strip_prefix('>').map(str::trim)
}

struct OpenCallout {
    kind: String,
    title: String,
    lines: Vec<String>,
}

impl OpenCallout {
    fn new(marker: Marker) -> Self {
        let title = marker.title.unwrap_or_else(|| marker.kind.to_uppercase());
        Self {
            kind: marker.kind,
            title,
            lines: Vec::new(),
        }
    }

    fn render(&self) -> String {
        let content = self.lines.join("\n");
        format!(
            "<div class=\"callout callout-{}\">\n<div class=\"callout-title\">{}</div>\n<div class=\"callout-content\">\n\n{}\n\n</div>\n</div>",
            self.kind,
            self.title,
            content.trim()
        )
    }
}

/// Render every callout in `content` as HTML; other lines pass through.
pub fn render_callouts(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut open: Option<OpenCallout> = None;

    for line in content.split('\n') {
        if let Some(marker) = parse_marker(line) {
            if let Some(callout) = open.take() {
                out.push(callout.render());
            }
            open = Some(OpenCallout::new(marker));
            continue;
        }

        let Some(callout) = open.as_mut() else {
            out.push(line.to_string());
            continue;
        };

        match quoted_body(line) {
            Some(body) => callout.lines.push(body.to_string()),
            None => {
                out.push(callout.render());
                open = None;
                out.push(line.to_string());
            }
        }
    }

    if let Some(callout) = open {
        out.push(callout.render());
    }

    out.join("\n")
}

/// Body of the first `[!SUMMARY]` callout joined into one line.
///
/// The type match is case-insensitive; collection stops at the next marker
/// or the first non-quoted line. Returns `None` when nothing was collected.
pub fn extract_summary_from_callout(content: &str) -> Option<String> {
    let mut in_summary = false;
    let mut parts: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        if let Some(marker) = parse_marker(line) {
            if marker.kind == "summary" {
                in_summary = true;
                continue;
            }
            if in_summary {
                break;
            }
        } else if in_summary {
            match quoted_body(line) {
                Some(body) => parts.push(body),
                None => break,
            }
        }
    }

    let summary = parts.join(" ").trim().to_string();
    (!summary.is_empty()).then_some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_callout() {
        let out = render_callouts("> [!NOTE]\n> This is a note");
        assert_eq!(
            out,
            "<div class=\"callout callout-note\">\n<div class=\"callout-title\">NOTE</div>\n<div class=\"callout-content\">\n\nThis is a note\n\n</div>\n</div>"
        );
    }

    #[test]
    fn test_custom_title() {
        let out = render_callouts("> [!WARNING] Be careful\n> Hot surface");
        assert!(out.contains("callout callout-warning"));
        assert!(out.contains("<div class=\"callout-title\">Be careful</div>"));
        assert!(out.contains("Hot surface"));
    }

    #[test]
    fn test_multiline_body_keeps_blank_lines() {
        let out = render_callouts("> [!INFO]\n> Line one\n>\n> Line two\n");
        assert!(out.contains("callout-info"));
        assert!(out.contains("\n\nLine one\n\nLine two\n\n"));
    }

    #[test]
    fn test_ends_at_unquoted_line() {
        let out = render_callouts("> [!TIP]\n> Inside\nOutside\n> plain quote");
        let (callout, rest) = out.split_once("</div>\n</div>").unwrap();
        assert!(callout.contains("Inside"));
        assert_eq!(rest, "\nOutside\n> plain quote");
    }

    #[test]
    fn test_plain_blockquote_unchanged() {
        let input = "> just a quote\n> over two lines";
        assert_eq!(render_callouts(input), input);
    }

    #[test]
    fn test_second_marker_flushes_first() {
        let out = render_callouts("> [!NOTE]\n> First callout\n> [!WARNING]\n> Second callout");
        assert_eq!(out.matches("<div class=\"callout ").count(), 2);
        let note = out.find("callout-note").unwrap();
        let warning = out.find("callout-warning").unwrap();
        assert!(note < warning);
        assert!(out[note..warning].contains("First callout"));
        assert!(!out[note..warning].contains("Second callout"));
    }

    #[test]
    fn test_summary_extraction() {
        assert_eq!(
            extract_summary_from_callout("> [!SUMMARY]\n> A short summary\n\nBody"),
            Some("A short summary".to_string())
        );
        assert_eq!(
            extract_summary_from_callout("> [!summary]\n> lower"),
            Some("lower".to_string())
        );
    }

    #[test]
    fn test_summary_joins_lines_and_stops_at_next_marker() {
        let content = "> [!SUMMARY]\n> first\n> second\n> [!NOTE]\n> not summary";
        assert_eq!(
            extract_summary_from_callout(content),
            Some("first second".to_string())
        );
    }

    #[test]
    fn test_summary_absent() {
        assert_eq!(extract_summary_from_callout("> [!NOTE]\n> a note"), None);
        assert_eq!(extract_summary_from_callout(""), None);
    }
}
