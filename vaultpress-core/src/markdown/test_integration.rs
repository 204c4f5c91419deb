//! Integration tests for the full rewrite pipeline

use super::*;
use crate::frontmatter::Frontmatter;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn doc(title: &str, slug: &str, content: &str) -> ParsedDocument {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    ParsedDocument {
        slug: slug.into(),
        title: title.into(),
        date,
        modified: date.and_hms_opt(0, 0, 0).unwrap(),
        content: content.into(),
        frontmatter: Frontmatter::default(),
        file_path: PathBuf::from("/source/test.md"),
    }
}

fn target_docs() -> Vec<ParsedDocument> {
    vec![doc("Target", "target", "")]
}

fn run(content: &str, docs: &[ParsedDocument]) -> TransformOutput {
    let index = PublishedIndex::build(docs);
    ContentTransformer::new(&index).transform(&doc("Test Doc", "test-doc", content))
}

#[test]
fn test_wikilinks_and_callouts_together() {
    let docs = vec![doc("Other Doc", "other-doc", "")];
    let out = run("See [[Other Doc]]\n\n> [!NOTE]\n> Remember this", &docs);

    assert!(out
        .document
        .processed_content
        .contains(r#"<a href="/posts/other-doc">Other Doc</a>"#));
    assert!(out.document.processed_content.contains("callout-note"));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_fenced_code_is_untouched() {
    let out = run("```\n[[Target]]\n```", &target_docs());
    assert_eq!(out.document.processed_content, "```\n[[Target]]\n```");
}

#[test]
fn test_inline_code_is_untouched() {
    let out = run("Use `[[Target]]` syntax", &target_docs());
    assert_eq!(out.document.processed_content, "Use `[[Target]]` syntax");
}

#[test]
fn test_code_protected_while_outside_is_rewritten() {
    let out = run("[[Target]] and ```\n[[Target]]\n```", &target_docs());
    assert!(out
        .document
        .processed_content
        .contains(r#"<a href="/posts/target">Target</a>"#));
    assert!(out.document.processed_content.contains("```\n[[Target]]\n```"));
}

#[test]
fn test_callouts_inside_code_are_untouched() {
    let input = "```\n> [!NOTE]\n> Inside code\n```";
    let out = run(input, &target_docs());
    assert_eq!(out.document.processed_content, input);
}

#[test]
fn test_multiple_code_blocks() {
    let out = run(
        "```js\n[[Target]]\n```\n\nNormal [[Target]]\n\n```py\n[[Target]]\n```",
        &target_docs(),
    );
    assert_eq!(out.document.processed_content.matches("<a href").count(), 1);
}

#[test]
fn test_empty_and_whitespace_content() {
    let out = run("", &[]);
    assert_eq!(out.document.processed_content, "");
    assert!(out.warnings.is_empty());

    let out = run("   \n\n   ", &[]);
    assert_eq!(out.document.processed_content.trim(), "");
}

#[test]
fn test_warnings_from_links_and_images() {
    let dir = tempdir().unwrap();
    let docs: Vec<ParsedDocument> = Vec::new();
    let index = PublishedIndex::build(&docs);
    let mut current = doc("Test Doc", "test-doc", "[[Missing Doc]] and ![[missing.png]]");
    current.file_path = dir.path().join("test.md");

    let out = ContentTransformer::new(&index)
        .with_source_root(dir.path())
        .transform(&current);

    assert_eq!(out.warnings.len(), 2);
    assert!(out.warnings[0].contains("Missing Doc"));
    assert!(out.warnings[0].contains("[Test Doc]"));
    assert_eq!(out.warnings[1], r#"[Test Doc] Image "missing.png" not found."#);
    assert!(out
        .document
        .processed_content
        .contains("![missing.png](/assets/test-doc/missing.png)"));
}

#[test]
fn test_images_resolved_without_warning() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("attachments")).unwrap();
    fs::write(dir.path().join("attachments/diagram.png"), b"png").unwrap();

    let docs: Vec<ParsedDocument> = Vec::new();
    let index = PublishedIndex::build(&docs);
    let mut current = doc("Pics", "pics", "Look:\n![[diagram.png|320]]");
    current.file_path = dir.path().join("pics.md");

    let out = ContentTransformer::new(&index)
        .with_source_root(dir.path())
        .transform(&current);

    assert!(out.warnings.is_empty());
    assert!(out.document.processed_content.contains(
        "\n\n<figure><img src=\"/assets/pics/diagram.png\" alt=\"diagram.png\" width=\"320\" /></figure>\n\n"
    ));
}

#[test]
fn test_embeds_left_alone_without_source_root() {
    let out = run("![[photo.png]]", &[]);
    assert_eq!(out.document.processed_content, "![[photo.png]]");
}

#[test]
fn test_embeds_inside_code_are_untouched() {
    let dir = tempdir().unwrap();
    let docs: Vec<ParsedDocument> = Vec::new();
    let index = PublishedIndex::build(&docs);
    let mut current = doc("Code", "code", "`![[raw.png]]`");
    current.file_path = dir.path().join("code.md");

    let out = ContentTransformer::new(&index)
        .with_source_root(dir.path())
        .transform(&current);

    assert_eq!(out.document.processed_content, "`![[raw.png]]`");
    assert!(out.warnings.is_empty());
}
