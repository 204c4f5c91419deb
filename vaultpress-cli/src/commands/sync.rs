//! Sync command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use vaultpress_core::{format_local_datetime, Config, SyncReconciler, SyncReport};

/// Sync the configured vault and log an itemized report
pub fn sync_vault(config_path: &Path) -> Result<()> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;

    let source_root = config.source_root();
    if !source_root.exists() {
        bail!("Source path does not exist: {}", source_root.display());
    }
    tracing::info!("Source path: {}", source_root.display());
    tracing::info!("Starting synchronization for {}", config.blog_name);

    let report = SyncReconciler::new(source_root, config.posts_dir(), config.assets_dir())
        .with_exclude_tags(config.posts.exclude_tags.clone())
        .run()
        .context("Failed to sync vault")?;

    log_report(&report);
    Ok(())
}

fn log_report(report: &SyncReport) {
    if !report.removed.is_empty() {
        tracing::info!("Removed documents ({}):", report.removed.len());
        for slug in &report.removed {
            tracing::info!("  {}", slug);
        }
    }

    if !report.synced.is_empty() {
        tracing::info!("Synced documents ({}):", report.synced.len());
        for doc in &report.synced {
            tracing::info!(
                "  {} (modified {})",
                doc.title,
                format_local_datetime(&doc.modified)
            );
        }
    }

    if !report.skipped.is_empty() {
        tracing::info!("Skipped documents ({}):", report.skipped.len());
        for skipped in &report.skipped {
            let last_sync = skipped
                .check
                .last_sync_time
                .as_ref()
                .map(format_local_datetime)
                .unwrap_or_else(|| "N/A".to_string());
            tracing::info!(
                "  {} (modified {}, last sync {}): {}",
                skipped.document.title,
                format_local_datetime(&skipped.document.modified),
                last_sync,
                skipped.check.reason
            );
        }
    }

    for warning in &report.warnings {
        tracing::warn!("{}", warning);
    }

    for image in &report.cleanup.removed_images {
        tracing::info!("Removed unused image {}", image);
    }
    for dir in &report.cleanup.removed_dirs {
        tracing::info!("Removed asset folder {}/", dir);
    }

    tracing::info!(
        "Sync complete: {} synced, {} skipped, {} removed",
        report.synced.len(),
        report.skipped.len(),
        report.removed.len()
    );
}
