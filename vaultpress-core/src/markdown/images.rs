//! Image embed discovery, resolution and rewriting for `![[file]]` syntax.

use crate::models::{ImageReference, ParsedDocument};
use crate::slug::file_stem;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

fn embed_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[\[([^\]|]+)(?:\|(\d+))?\]\]").expect("valid regex"))
}

/// Collect image embeds, one entry per filename (first width wins).
pub fn find_image_references(content: &str) -> Vec<ImageReference> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for caps in embed_regex().captures_iter(content) {
        let filename = caps[1].to_string();
        if seen.insert(filename.clone()) {
            images.push(ImageReference {
                filename,
                width: parse_width(&caps),
            });
        }
    }

    images
}

/// Locate an embedded image on disk.
///
/// Search order: `<doc dir>/assets/<doc name>/`, the document's directory,
/// `<root>/assets/<doc name>/`, `<root>/attachments/`, `<root>/images/`,
/// `<root>/assets/`, then a recursive walk of the whole source root.
pub fn find_image_file(filename: &str, doc_path: &Path, source_root: &Path) -> Option<PathBuf> {
    let doc_name = file_stem(doc_path);
    let doc_dir = doc_path.parent().unwrap_or(Path::new(""));

    let candidates = [
        doc_dir.join("assets").join(&doc_name).join(filename),
        doc_dir.join(filename),
        source_root.join("assets").join(&doc_name).join(filename),
        source_root.join("attachments").join(filename),
        source_root.join("images").join(filename),
        source_root.join("assets").join(filename),
    ];

    candidates
        .into_iter()
        .find(|path| path.is_file())
        .or_else(|| search_file(source_root, filename))
}

/// Depth-first search for a file by name, skipping dot entries.
fn search_file(root: &Path, filename: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == filename)
        .map(|e| e.into_path())
}

pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Rewrite every embed to point at `/assets/<slug>/<file>`.
///
/// Plain embeds become Markdown images; width-qualified ones become a
/// `<figure>`-wrapped `<img>`. Both are padded with blank lines so the
/// renderer treats them as blocks.
pub fn rewrite_image_embeds(content: &str, slug: &str) -> String {
    embed_regex()
        .replace_all(content, |caps: &Captures| {
            let filename = &caps[1];
            match parse_width(caps).filter(|w| *w > 0) {
                Some(width) => format!(
                    "\n\n<figure><img src=\"/assets/{slug}/{filename}\" alt=\"{filename}\" width=\"{width}\" /></figure>\n\n"
                ),
                None => format!("\n\n![{filename}](/assets/{slug}/{filename})\n\n"),
            }
        })
        .into_owned()
}

/// Rewriter that checks embeds against the vault and relocates them
pub struct ImageTransformer<'a> {
    source_root: &'a Path,
}

impl<'a> ImageTransformer<'a> {
    pub fn new(source_root: &'a Path) -> Self {
        Self { source_root }
    }

    /// Returns (rewritten_content, warnings) where each unresolvable image
    /// produces one warning. Rewriting happens regardless.
    pub fn transform(&self, content: &str, doc: &ParsedDocument) -> (String, Vec<String>) {
        let warnings = find_image_references(content)
            .into_iter()
            .filter(|image| find_image_file(&image.filename, &doc.file_path, self.source_root).is_none())
            .map(|image| format!("[{}] Image \"{}\" not found.", doc.title, image.filename))
            .collect();

        (rewrite_image_embeds(content, &doc.slug), warnings)
    }
}

fn parse_width(caps: &Captures) -> Option<u32> {
    caps.get(2).and_then(|m| m.as_str().parse().ok())
}
