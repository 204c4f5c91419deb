//! Asset garbage collection and output cleaning.

use crate::markdown::images::is_hidden;
use crate::models::CleanupReport;
use crate::sync::{list_markdown_outputs, SyncError};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn img_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<img[^>]+src="/assets/([^"]+)"[^>]*>"#).expect("valid regex"))
}

fn md_image_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!\[[^\]]*\]\(/assets/([^)]+)\)").expect("valid regex"))
}

/// Filenames under `/assets/<slug>/` referenced by a post's final content.
fn referenced_images(content: &str, slug: &str) -> HashSet<String> {
    img_tag_regex()
        .captures_iter(content)
        .chain(md_image_regex().captures_iter(content))
        .filter_map(|caps| {
            let path = caps.get(1)?.as_str();
            match path.split('/').collect::<Vec<_>>().as_slice() {
                [owner, file] if *owner == slug => Some(file.to_string()),
                _ => None,
            }
        })
        .collect()
}

/// Mark-and-sweep over `<asset_dir>/<slug>/<file>`.
///
/// Directories with no matching post are removed whole; inside a live
/// directory, files the post no longer references are removed, and the
/// directory goes too once it is empty.
pub fn cleanup_unused_images(posts_dir: &Path, asset_dir: &Path) -> Result<CleanupReport, SyncError> {
    let mut report = CleanupReport::default();
    if !asset_dir.is_dir() {
        return Ok(report);
    }

    // `None` marks a post that could not be read; its directory is left alone.
    let mut used: HashMap<String, Option<HashSet<String>>> = HashMap::new();
    for post in list_markdown_outputs(posts_dir)? {
        let Some(slug) = post.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        let images = match fs::read_to_string(&post) {
            Ok(content) => Some(referenced_images(&content, &slug)),
            Err(err) => {
                tracing::warn!("Keeping assets of unreadable post {:?}: {}", post, err);
                None
            }
        };
        used.insert(slug, images);
    }

    for dir in sorted_entries(asset_dir)? {
        if !dir.is_dir() {
            continue;
        }
        let name = entry_name(&dir);

        let referenced = match used.get(&name) {
            Some(Some(referenced)) => referenced,
            Some(None) => continue,
            None => {
                fs::remove_dir_all(&dir).map_err(SyncError::io(&dir))?;
                tracing::debug!("Removed asset directory {:?}", dir);
                report.removed_dirs.push(name);
                continue;
            }
        };

        for file in sorted_entries(&dir)? {
            let file_name = entry_name(&file);
            if referenced.contains(&file_name) {
                continue;
            }
            remove_entry(&file)?;
            report.removed_images.push(format!("{name}/{file_name}"));
        }

        if sorted_entries(&dir)?.is_empty() {
            fs::remove_dir(&dir).map_err(SyncError::io(&dir))?;
            report.removed_dirs.push(name);
        }
    }

    Ok(report)
}

/// What `clean` removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Markdown files removed from the posts directory
    pub posts: usize,

    /// Top-level entries removed from the asset root
    pub assets: usize,

    /// Whether a build output directory existed and was removed
    pub dist: bool,
}

/// Remove synced posts, copied assets and the build output.
///
/// Dot entries such as `.gitkeep` survive in the posts and asset directories.
pub fn clean(posts_dir: &Path, asset_dir: &Path, dist_dir: &Path) -> Result<CleanReport, SyncError> {
    let posts = clean_directory(posts_dir, |path| {
        path.extension().is_some_and(|ext| ext == "md")
    })?;
    let assets = clean_directory(asset_dir, |_| true)?;

    let dist = dist_dir.exists();
    if dist {
        fs::remove_dir_all(dist_dir).map_err(SyncError::io(dist_dir))?;
    }

    Ok(CleanReport { posts, assets, dist })
}

fn clean_directory(dir: &Path, selected: impl Fn(&Path) -> bool) -> Result<usize, SyncError> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut count = 0;
    for entry in sorted_entries(dir)? {
        let hidden = entry.file_name().is_some_and(is_hidden);
        if hidden || !selected(&entry) {
            continue;
        }
        remove_entry(&entry)?;
        count += 1;
    }
    Ok(count)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut entries = fs::read_dir(dir)
        .map_err(SyncError::io(dir))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(SyncError::io(dir))?;
    entries.sort();
    Ok(entries)
}

fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(SyncError::io(path))
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
