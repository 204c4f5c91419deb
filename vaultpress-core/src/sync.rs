//! Sync reconciliation: decides which vault notes need regenerating, writes
//! them to the posts directory, copies their images and prunes whatever no
//! longer has a publishable source.

use crate::cleanup::cleanup_unused_images;
use crate::document::{filter_publishable, find_markdown_files, parse_document};
use crate::frontmatter::{generate_frontmatter, parse_frontmatter};
use crate::markdown::{find_image_file, find_image_references, shield_code, ContentTransformer};
use crate::models::*;
use crate::timestamp::{now_local, parse_sync_timestamp};
use serde_yaml::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> SyncError {
        let path = path.into();
        move |source| SyncError::Io { path, source }
    }
}

/// Output path for a slug inside the posts directory.
pub fn output_path(output_dir: &Path, slug: &str) -> PathBuf {
    output_dir.join(format!("{slug}.md"))
}

/// Compare a document against the `publish_sync_at` stamp of its existing output.
pub fn check_should_sync(doc: &ParsedDocument, output_dir: &Path) -> SyncCheck {
    if !doc.is_publishable() {
        return SyncCheck::skip(SyncReason::NotPublishable);
    }

    let existing = output_path(output_dir, &doc.slug);
    if !existing.exists() {
        return SyncCheck::sync(SyncReason::NewFile);
    }

    let frontmatter = match fs::read_to_string(&existing)
        .map_err(|e| e.to_string())
        .and_then(|raw| parse_frontmatter(&raw).map_err(|e| e.to_string()))
    {
        Ok((frontmatter, _)) => frontmatter,
        Err(e) => {
            tracing::debug!("Failed to read existing output {:?}: {}", existing, e);
            return SyncCheck::sync(SyncReason::ErrorReadingExisting);
        }
    };

    let raw_stamp = match frontmatter.get("publish_sync_at") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => {
            return SyncCheck::sync(SyncReason::NoSyncTimestamp)
        }
        Some(Value::String(s)) if s.is_empty() => {
            return SyncCheck::sync(SyncReason::NoSyncTimestamp)
        }
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
            return SyncCheck::sync(SyncReason::NoSyncTimestamp)
        }
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => None,
    };

    let Some(last_sync_time) = raw_stamp.and_then(parse_sync_timestamp) else {
        return SyncCheck::sync(SyncReason::InvalidSyncTimestamp);
    };

    let mut check = if doc.modified > last_sync_time {
        SyncCheck::sync(SyncReason::ModifiedAfterSync)
    } else {
        SyncCheck::skip(SyncReason::UpToDate)
    };
    check.last_sync_time = Some(last_sync_time);
    check
}

/// One sync run over a vault and its output directories
pub struct SyncReconciler {
    source_root: PathBuf,
    output_dir: PathBuf,
    asset_dir: PathBuf,
    exclude_tags: Option<Vec<String>>,
}

impl SyncReconciler {
    pub fn new(
        source_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        asset_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            output_dir: output_dir.into(),
            asset_dir: asset_dir.into(),
            exclude_tags: None,
        }
    }

    /// Tags dropped from generated frontmatter
    pub fn with_exclude_tags(mut self, exclude_tags: Option<Vec<String>>) -> Self {
        self.exclude_tags = exclude_tags;
        self
    }

    pub fn run(&self) -> Result<SyncReport, SyncError> {
        if !self.source_root.is_dir() {
            return Err(SyncError::SourceNotFound(self.source_root.clone()));
        }
        fs::create_dir_all(&self.output_dir).map_err(SyncError::io(&self.output_dir))?;
        fs::create_dir_all(&self.asset_dir).map_err(SyncError::io(&self.asset_dir))?;

        let markdown_files = find_markdown_files(&self.source_root);
        tracing::info!("Found {} markdown files", markdown_files.len());

        let documents: Vec<ParsedDocument> = markdown_files
            .iter()
            .filter_map(|path| match parse_document(path) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    tracing::debug!("Skipping unparseable source {:?}: {}", path, e);
                    None
                }
            })
            .collect();
        let publishable = filter_publishable(documents);
        tracing::info!("{} publishable documents", publishable.len());

        let mut report = SyncReport {
            warnings: duplicate_slug_warnings(&publishable),
            ..SyncReport::default()
        };

        let mut to_sync = Vec::new();
        for doc in &publishable {
            let check = check_should_sync(doc, &self.output_dir);
            tracing::debug!("{} -> {}", doc.slug, check.reason);
            if check.should_sync {
                to_sync.push(doc);
            } else {
                report.skipped.push(SkippedDocument {
                    document: doc.clone(),
                    check,
                });
            }
        }

        let live_slugs: HashSet<&str> = publishable.iter().map(|d| d.slug.as_str()).collect();
        report.removed = self.remove_stale_outputs(&live_slugs)?;

        let index = PublishedIndex::build(&publishable);
        let transformer = ContentTransformer::new(&index).with_source_root(&self.source_root);
        let exclude_tags = self.exclude_tags.as_deref();

        for doc in to_sync {
            let mut output = transformer.transform(doc);
            report.warnings.append(&mut output.warnings);

            let frontmatter = generate_frontmatter(&output.document, exclude_tags, &now_local());
            let body = format!("{}\n\n{}", frontmatter, output.document.processed_content);
            write_atomic(&output_path(&self.output_dir, &doc.slug), &body)?;

            self.copy_images(doc, &mut report.warnings)?;
            report.synced.push(doc.clone());
        }

        report.cleanup = cleanup_unused_images(&self.output_dir, &self.asset_dir)?;

        Ok(report)
    }

    /// Delete `<slug>.md` outputs whose slug has no publishable source.
    fn remove_stale_outputs(&self, live_slugs: &HashSet<&str>) -> Result<Vec<String>, SyncError> {
        let mut removed = Vec::new();
        for path in list_markdown_outputs(&self.output_dir)? {
            let Some(slug) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            if live_slugs.contains(slug.as_str()) {
                continue;
            }
            fs::remove_file(&path).map_err(SyncError::io(&path))?;
            tracing::debug!("Removed stale output {:?}", path);
            removed.push(slug);
        }
        Ok(removed)
    }

    /// Copy every resolvable embed of the original body into `<assets>/<slug>/`.
    fn copy_images(&self, doc: &ParsedDocument, warnings: &mut Vec<String>) -> Result<(), SyncError> {
        let shielded = shield_code(&doc.content);
        let images = find_image_references(&shielded.text);
        if images.is_empty() {
            return Ok(());
        }

        let slug_dir = self.asset_dir.join(&doc.slug);
        fs::create_dir_all(&slug_dir).map_err(SyncError::io(&slug_dir))?;

        for image in images {
            if !is_plain_filename(&image.filename) {
                warnings.push(format!(
                    "[{}] Image \"{}\" is not a plain file name and was not copied.",
                    doc.title, image.filename
                ));
                continue;
            }
            let Some(source) = find_image_file(&image.filename, &doc.file_path, &self.source_root)
            else {
                continue;
            };
            let target = slug_dir.join(&image.filename);
            match fs::copy(&source, &target) {
                Ok(_) => tracing::debug!("Copied {:?} -> {:?}", source, target),
                Err(err) => warnings.push(format!(
                    "[{}] Image \"{}\" could not be copied: {}",
                    doc.title, image.filename, err
                )),
            }
        }
        Ok(())
    }
}

/// Run a sync with the given directories.
pub fn sync_source(
    source_root: &Path,
    output_dir: &Path,
    asset_dir: &Path,
    exclude_tags: Option<&[String]>,
) -> Result<SyncReport, SyncError> {
    SyncReconciler::new(source_root, output_dir, asset_dir)
        .with_exclude_tags(exclude_tags.map(<[String]>::to_vec))
        .run()
}

/// Top-level `*.md` files of a directory, sorted.
pub(crate) fn list_markdown_outputs(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(SyncError::io(dir))? {
        let path = entry.map_err(SyncError::io(dir))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Write through a temp file in the same directory, then rename over the target.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), SyncError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(SyncError::io(dir))?;
    file.write_all(contents.as_bytes())
        .map_err(SyncError::io(path))?;
    file.persist(path)
        .map_err(|e| SyncError::io(path)(e.error))?;
    Ok(())
}

fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn duplicate_slug_warnings(docs: &[ParsedDocument]) -> Vec<String> {
    let mut owners: HashMap<&str, &str> = HashMap::new();
    let mut warnings = Vec::new();
    for doc in docs {
        if let Some(first) = owners.insert(doc.slug.as_str(), doc.title.as_str()) {
            tracing::warn!("Duplicate slug: {}", doc.slug);
            warnings.push(format!(
                "[{}] Slug \"{}\" is already used by \"{}\".",
                doc.title, doc.slug, first
            ));
        }
    }
    warnings
}
