//! Vault-syntax rewriting pipeline for post bodies.
//!
//! Order matters: code is shielded first, then wikilinks, image embeds and
//! callouts are rewritten, and code is restored last.

pub mod callouts;
pub mod code_shield;
pub mod images;
pub mod wikilinks;

#[cfg(test)]
mod test_integration;

use crate::models::{ParsedDocument, PublishableDocument, PublishedIndex};
use std::path::Path;

pub use callouts::{extract_summary_from_callout, render_callouts};
pub use code_shield::{shield_code, ShieldedText};
pub use images::{find_image_file, find_image_references, rewrite_image_embeds, ImageTransformer};
pub use wikilinks::WikilinkTransformer;

/// A transformed document plus the warnings raised while transforming it
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub document: PublishableDocument,
    pub warnings: Vec<String>,
}

/// Runs the rewriters over one document body
pub struct ContentTransformer<'a> {
    index: &'a PublishedIndex<'a>,
    source_root: Option<&'a Path>,
}

impl<'a> ContentTransformer<'a> {
    pub fn new(index: &'a PublishedIndex<'a>) -> Self {
        Self {
            index,
            source_root: None,
        }
    }

    /// Enable image resolution against the vault root
    pub fn with_source_root(mut self, source_root: &'a Path) -> Self {
        self.source_root = Some(source_root);
        self
    }

    pub fn transform(&self, doc: &ParsedDocument) -> TransformOutput {
        let shielded = shield_code(&doc.content);
        let mut warnings = Vec::new();

        let (content, mut link_warnings) =
            WikilinkTransformer::new(self.index).transform(&shielded.text, doc);
        warnings.append(&mut link_warnings);

        let content = match self.source_root {
            Some(root) => {
                let (content, mut image_warnings) =
                    ImageTransformer::new(root).transform(&content, doc);
                warnings.append(&mut image_warnings);
                content
            }
            None => content,
        };

        let content = render_callouts(&content);
        let processed_content = shielded.restore(&content);

        TransformOutput {
            document: PublishableDocument {
                document: doc.clone(),
                processed_content,
            },
            warnings,
        }
    }
}
