//! # vaultpress-translate
//!
//! Machine translation for synced vaultpress posts: language detection,
//! pluggable translation backends, and the orchestration that writes
//! `<slug>_<lang>.md` variants next to the originals.

pub mod detect;
pub mod error;
pub mod orchestrator;
pub mod translator;

pub use detect::detect_language;
pub use error::TranslateError;
pub use orchestrator::{
    find_posts_to_translate, load_posts, save_translated_post, translate_post,
    translated_frontmatter, PostFile, TranslateOptions, TranslationJob, TranslationResult,
    TranslationSession, TranslationSummary,
};
pub use translator::{create_translator, GoogleFreeTranslator, LlmTranslator, Translator};
