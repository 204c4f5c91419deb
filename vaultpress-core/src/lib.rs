//! # vaultpress-core
//!
//! Core library for the vaultpress vault-to-blog sync tool.
//!
//! This crate reads notes from a Markdown vault, decides which ones are
//! published and stale, rewrites vault syntax (wikilinks, image embeds,
//! callouts) into site-ready Markdown, and keeps the posts and asset
//! directories consistent with the vault.

pub mod cleanup;
pub mod config;
pub mod document;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod slug;
pub mod sync;
pub mod timestamp;

pub use cleanup::{clean, cleanup_unused_images, CleanReport};
pub use config::{Config, ConfigError, Provider, TranslateSettings};
pub use document::{filter_publishable, find_markdown_files, parse_document, DocumentError};
pub use frontmatter::{
    filter_excluded_tags, format_yaml_string, generate_frontmatter, parse_frontmatter,
    render_mapping, Frontmatter, FrontmatterError,
};
pub use markdown::{ContentTransformer, TransformOutput};
pub use models::{
    CleanupReport, ImageReference, ParsedDocument, PublishableDocument, PublishedIndex,
    SkippedDocument, SyncCheck, SyncReason, SyncReport,
};
pub use slug::{generate_slug, slugify};
pub use sync::{check_should_sync, sync_source, write_atomic, SyncError, SyncReconciler};
pub use timestamp::{format_local_datetime, now_local, parse_sync_timestamp};
