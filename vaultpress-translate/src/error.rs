use std::path::PathBuf;
use thiserror::Error;
use vaultpress_core::{FrontmatterError, SyncError};

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} API error: {status} - {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {0}")]
    InvalidResponse(String),

    #[error("{0} returned no translated text")]
    EmptyResponse(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error(transparent)]
    Write(#[from] SyncError),
}
