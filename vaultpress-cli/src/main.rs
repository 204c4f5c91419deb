//! # vaultpress CLI
//!
//! Command-line interface for syncing a Markdown vault into a blog's
//! content directory and translating the synced posts.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vaultpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "vaultpress.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync published vault notes into the posts directory
    Sync,

    /// Translate synced posts into the configured target languages
    Translate {
        /// Retranslate posts that already have a translation
        #[arg(short, long)]
        force: bool,

        /// Only translate the post with this slug
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// Remove synced posts, copied assets and build output
    Clean,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Sync => commands::sync_vault(&cli.config),
        Commands::Translate { force, slug } => {
            let options = commands::TranslateOptions { force, slug };
            commands::translate_posts(&cli.config, options).await
        }
        Commands::Clean => commands::clean_output(&cli.config),
    }
}
