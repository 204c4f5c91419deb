//! Content model structs for vault documents, sync decisions and run reports.

use crate::frontmatter::Frontmatter;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// A single source note read from the vault
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// URL slug and output file stem (e.g., "rust-safety")
    pub slug: String,

    /// Display title (frontmatter title, else file stem)
    pub title: String,

    /// Effective publish date: `date`, else `created`, else file birth time
    pub date: NaiveDate,

    /// Source modification time in local time, whole seconds
    pub modified: NaiveDateTime,

    /// Raw markdown body without frontmatter
    pub content: String,

    /// Original frontmatter
    pub frontmatter: Frontmatter,

    /// Absolute path of the source file
    pub file_path: PathBuf,
}

impl ParsedDocument {
    pub fn is_publishable(&self) -> bool {
        self.frontmatter.is_published()
    }
}

/// A document that passed the publish filter, with its transformed body
#[derive(Debug, Clone, PartialEq)]
pub struct PublishableDocument {
    pub document: ParsedDocument,
    pub processed_content: String,
}

/// An `![[file]]` or `![[file|width]]` embed found in a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub filename: String,
    pub width: Option<u32>,
}

/// Why a document was (or was not) selected for sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReason {
    NotPublishable,
    NewFile,
    NoSyncTimestamp,
    InvalidSyncTimestamp,
    ModifiedAfterSync,
    UpToDate,
    ErrorReadingExisting,
}

impl SyncReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncReason::NotPublishable => "not publishable",
            SyncReason::NewFile => "new file",
            SyncReason::NoSyncTimestamp => "no sync timestamp",
            SyncReason::InvalidSyncTimestamp => "invalid sync timestamp format",
            SyncReason::ModifiedAfterSync => "modified after sync",
            SyncReason::UpToDate => "up to date",
            SyncReason::ErrorReadingExisting => "error reading existing file",
        }
    }
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing a source document against its existing output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCheck {
    pub should_sync: bool,
    pub reason: SyncReason,
    pub last_sync_time: Option<NaiveDateTime>,
}

impl SyncCheck {
    pub fn sync(reason: SyncReason) -> Self {
        Self {
            should_sync: true,
            reason,
            last_sync_time: None,
        }
    }

    pub fn skip(reason: SyncReason) -> Self {
        Self {
            should_sync: false,
            reason,
            last_sync_time: None,
        }
    }
}

/// Lookup from every reference string (title, slug, alias) to its document.
///
/// Later documents overwrite earlier ones on key collisions.
#[derive(Debug, Default)]
pub struct PublishedIndex<'a> {
    entries: HashMap<String, &'a ParsedDocument>,
}

impl<'a> PublishedIndex<'a> {
    pub fn build(docs: &'a [ParsedDocument]) -> Self {
        let mut entries = HashMap::new();
        for doc in docs {
            entries.insert(doc.title.clone(), doc);
            entries.insert(doc.slug.clone(), doc);
            for alias in doc.frontmatter.aliases().unwrap_or_default() {
                entries.insert(alias, doc);
            }
        }
        Self { entries }
    }

    pub fn get(&self, reference: &str) -> Option<&'a ParsedDocument> {
        self.entries.get(reference).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Audit trail of an unused-asset sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// `<slug>/<filename>` entries that were deleted
    pub removed_images: Vec<String>,

    /// Asset directories (by slug) that were deleted
    pub removed_dirs: Vec<String>,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed_images.is_empty() && self.removed_dirs.is_empty()
    }
}

/// A publishable document left untouched this run
#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub document: ParsedDocument,
    pub check: SyncCheck,
}

/// Everything a sync run did
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub synced: Vec<ParsedDocument>,
    pub skipped: Vec<SkippedDocument>,
    pub removed: Vec<String>,
    pub warnings: Vec<String>,
    pub cleanup: CleanupReport,
}
