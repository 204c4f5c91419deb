//! Translate command implementation.

use anyhow::{bail, Context, Result};
use std::path::Path;
use vaultpress_core::Config;
use vaultpress_translate::{
    create_translator, find_posts_to_translate, load_posts, TranslateOptions, TranslationSession,
};

/// Translate every post missing a configured target language
pub async fn translate_posts(config_path: &Path, options: TranslateOptions) -> Result<()> {
    let config = Config::from_file(config_path).context("Failed to load configuration")?;

    let Some(settings) = config.translate_settings().filter(|s| s.enabled) else {
        bail!("Translation is not enabled; set posts.translate.enabled: true in the config");
    };
    if settings.target_langs.is_empty() {
        bail!("No target languages configured in posts.translate.target_langs");
    }

    let default_lang = config.locale.as_str();
    tracing::info!("Default language: {}", default_lang);
    tracing::info!("Target languages: {}", settings.target_langs.join(", "));

    let posts_dir = config.posts_dir();
    if !posts_dir.is_dir() {
        bail!(
            "Posts directory not found: {} (run `vaultpress sync` first)",
            posts_dir.display()
        );
    }

    let posts = load_posts(&posts_dir).context("Failed to read posts")?;
    tracing::info!("Found {} post files", posts.len());

    let jobs = find_posts_to_translate(&posts, default_lang, &settings.target_langs, &options);
    if jobs.is_empty() {
        tracing::info!("All posts are already translated");
        return Ok(());
    }
    tracing::info!("Posts to translate: {}", jobs.len());

    let session = TranslationSession::new(create_translator(Some(settings)), &posts_dir, default_lang);
    tracing::info!("Using: {}", session.translator_name());

    let summary = session.run(&jobs).await;
    tracing::info!(
        "Translation summary: {} succeeded, {} failed",
        summary.success,
        summary.failed
    );

    Ok(())
}
