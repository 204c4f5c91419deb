use anyhow::{Context, Result};
use std::path::Path;
use vaultpress_core::{clean, Config};

/// Remove synced content and build output
pub fn clean_output(config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;

    let report = clean(&config.posts_dir(), &config.assets_dir(), &config.dist_dir())
        .context("Failed to clean output")?;

    if report.posts > 0 {
        tracing::info!("Posts: {} files removed", report.posts);
    } else {
        tracing::info!("Posts: already clean");
    }
    if report.assets > 0 {
        tracing::info!("Assets: {} entries removed", report.assets);
    } else {
        tracing::info!("Assets: already clean");
    }
    if report.dist {
        tracing::info!("Dist: build output removed");
    } else {
        tracing::info!("Dist: no build output found");
    }

    Ok(())
}
