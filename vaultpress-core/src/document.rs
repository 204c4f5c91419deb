//! Source document discovery and parsing.

use crate::frontmatter::{parse_frontmatter, Frontmatter, FrontmatterError};
use crate::markdown::images::is_hidden;
use crate::models::ParsedDocument;
use crate::slug::{file_stem, generate_slug};
use crate::timestamp::system_time_to_local;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Every `.md` file under `root`, skipping dot-prefixed entries at any depth.
pub fn find_markdown_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
        .map(|e| e.into_path())
        .collect()
}

/// Read and parse a single source note.
pub fn parse_document(path: &Path) -> Result<ParsedDocument, DocumentError> {
    let raw = fs::read_to_string(path)?;
    let (frontmatter, content) = parse_frontmatter(&raw)?;

    let metadata = fs::metadata(path)?;
    let modified_time = metadata.modified()?;
    let birth_time = metadata.created().unwrap_or(modified_time);

    let declared_title = frontmatter.title().filter(|t| !t.is_empty());
    let slug = generate_slug(path, declared_title.as_deref());
    let title = declared_title.unwrap_or_else(|| file_stem(path));

    let date = effective_date(&frontmatter)
        .unwrap_or_else(|| system_time_to_local(birth_time).date());

    Ok(ParsedDocument {
        slug,
        title,
        date,
        modified: system_time_to_local(modified_time),
        content,
        frontmatter,
        file_path: path.to_path_buf(),
    })
}

/// Keep only documents flagged for publication.
pub fn filter_publishable(docs: Vec<ParsedDocument>) -> Vec<ParsedDocument> {
    docs.into_iter().filter(|d| d.is_publishable()).collect()
}

/// `date`, else `created`; unparseable values fall through to the next source.
fn effective_date(frontmatter: &Frontmatter) -> Option<NaiveDate> {
    ["date", "created"]
        .iter()
        .filter_map(|key| frontmatter.get(key))
        .find_map(parse_date_value)
}

fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    let Value::String(raw) = value else {
        return None;
    };
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y/%m/%d").ok()
}
