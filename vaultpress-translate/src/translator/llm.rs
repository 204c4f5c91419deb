use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use vaultpress_core::Provider;

use super::Translator;
use crate::error::TranslateError;

/// A fully built provider call
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Value,
}

/// Request building and response extraction for one provider API
trait ChatApi: Send + Sync {
    fn display_name(&self) -> &'static str;

    fn build_request(&self, api_key: &str, model: &str, system_prompt: &str, user: &str)
        -> LlmRequest;

    fn extract_text(&self, response: &Value) -> Option<String>;
}

struct OpenAiChat;

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

impl ChatApi for OpenAiChat {
    fn display_name(&self) -> &'static str {
        "OpenAI"
    }

    fn build_request(&self, api_key: &str, model: &str, system_prompt: &str, user: &str) -> LlmRequest {
        LlmRequest {
            url: "https://api.openai.com/v1/chat/completions".into(),
            headers: vec![("Authorization", format!("Bearer {api_key}"))],
            body: json!({
                "model": model,
                "messages": [
                    { "role": "system", "content": system_prompt },
                    { "role": "user", "content": user },
                ],
                "temperature": 0.3,
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        let response = OpenAiResponse::deserialize(response).ok()?;
        response.choices.into_iter().next()?.message.content
    }
}

struct AnthropicMessages;

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

impl ChatApi for AnthropicMessages {
    fn display_name(&self) -> &'static str {
        "Anthropic"
    }

    fn build_request(&self, api_key: &str, model: &str, system_prompt: &str, user: &str) -> LlmRequest {
        LlmRequest {
            url: "https://api.anthropic.com/v1/messages".into(),
            headers: vec![
                ("x-api-key", api_key.to_string()),
                ("anthropic-version", "2023-06-01".to_string()),
            ],
            body: json!({
                "model": model,
                "max_tokens": 8192,
                "system": system_prompt,
                "messages": [{ "role": "user", "content": user }],
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        let response = AnthropicResponse::deserialize(response).ok()?;
        response.content.into_iter().next()?.text
    }
}

struct GoogleGenerateContent;

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: GoogleContent,
}

#[derive(Debug, Deserialize)]
struct GoogleContent {
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
struct GooglePart {
    text: Option<String>,
}

impl ChatApi for GoogleGenerateContent {
    fn display_name(&self) -> &'static str {
        "Google AI"
    }

    fn build_request(&self, api_key: &str, model: &str, system_prompt: &str, user: &str) -> LlmRequest {
        LlmRequest {
            url: format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent?key={api_key}"
            ),
            headers: Vec::new(),
            body: json!({
                "contents": [{ "parts": [{ "text": format!("{system_prompt}\n\n{user}") }] }],
                "generationConfig": { "temperature": 0.3 },
            }),
        }
    }

    fn extract_text(&self, response: &Value) -> Option<String> {
        let response = GoogleResponse::deserialize(response).ok()?;
        let candidate = response.candidates.into_iter().next()?;
        candidate.content.parts.into_iter().next()?.text
    }
}

fn chat_api(provider: Provider) -> &'static dyn ChatApi {
    match provider {
        Provider::OpenAi => &OpenAiChat,
        Provider::Anthropic => &AnthropicMessages,
        Provider::Google => &GoogleGenerateContent,
    }
}

/// English name of a language code for the prompt; unknown codes pass through.
pub fn language_name(code: &str) -> String {
    let name = match code.to_lowercase().as_str() {
        "ko" => "Korean",
        "en" => "English",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "zh-cn" => "Simplified Chinese",
        "zh-tw" => "Traditional Chinese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        _ => return code.to_string(),
    };
    name.to_string()
}

pub fn system_prompt(source_lang: &str, target_lang: &str) -> String {
    format!(
        "You are a professional translator. Translate the following markdown content from {} to {}.

Rules:
1. Preserve all markdown syntax (headers, links, code blocks, etc.)
2. Preserve all frontmatter YAML as-is (do not translate)
3. Keep technical terms, code, URLs, and file paths unchanged
4. Maintain the same tone and style
5. Output ONLY the translated text, no explanations",
        language_name(source_lang),
        language_name(target_lang)
    )
}

/// Chat-model translator for one provider, API key and model
pub struct LlmTranslator {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
}

impl LlmTranslator {
    pub fn new(provider: Provider, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            provider,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// The request that `translate` would send
    pub fn build_request(&self, text: &str, source_lang: &str, target_lang: &str) -> LlmRequest {
        chat_api(self.provider).build_request(
            &self.api_key,
            &self.model,
            &system_prompt(source_lang, target_lang),
            text,
        )
    }

    /// Pull the translated text out of a provider response body
    pub fn extract_text(&self, response: &Value) -> Result<String, TranslateError> {
        chat_api(self.provider)
            .extract_text(response)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| TranslateError::EmptyResponse(self.name()))
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        let request = self.build_request(text, source_lang, target_lang);

        let mut builder = self.client.post(&request.url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} API error ({}): {}", self.provider.as_str(), status, body);
            return Err(TranslateError::Api {
                provider: self.provider.as_str().to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let data: Value = response.json().await?;
        self.extract_text(&data)
    }

    fn name(&self) -> String {
        format!("{} ({})", chat_api(self.provider).display_name(), self.model)
    }
}
