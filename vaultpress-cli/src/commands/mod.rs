//! CLI command implementations.

pub mod clean;
pub mod sync;
pub mod translate;

pub use clean::clean_output;
pub use sync::sync_vault;
pub use translate::translate_posts;
pub use vaultpress_translate::TranslateOptions;
