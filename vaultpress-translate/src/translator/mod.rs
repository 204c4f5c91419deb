/*!
 * Translation backends.
 *
 * Two interchangeable implementations of [`Translator`]:
 * - [`GoogleFreeTranslator`]: keyless web translation endpoint
 * - [`LlmTranslator`]: OpenAI, Anthropic or Google AI chat models
 */

use async_trait::async_trait;
use vaultpress_core::TranslateSettings;

use crate::error::TranslateError;

pub mod google_free;
pub mod llm;

pub use google_free::GoogleFreeTranslator;
pub use llm::LlmTranslator;

/// Common interface for all translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang` (ISO-style codes)
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError>;

    /// Human-readable backend name for logs
    fn name(&self) -> String;
}

/// Pick a backend for this session.
///
/// The LLM backend is used only when provider, API key (after `${VAR}`
/// resolution) and model are all present; otherwise the free web backend.
pub fn create_translator(settings: Option<&TranslateSettings>) -> Box<dyn Translator> {
    let llm = settings.and_then(|s| {
        let provider = s.provider?;
        let api_key = s.resolved_api_key()?;
        let model = s.model.clone().filter(|m| !m.is_empty())?;
        Some(LlmTranslator::new(provider, api_key, model))
    });

    match llm {
        Some(translator) => Box::new(translator),
        None => Box::new(GoogleFreeTranslator::new()),
    }
}
