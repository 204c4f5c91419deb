use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::Translator;
use crate::error::TranslateError;

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const NAME: &str = "Google Translate (Free)";

/// Client for the keyless `translate_a/single` endpoint
#[derive(Debug, Default)]
pub struct GoogleFreeTranslator {
    client: Client,
}

impl GoogleFreeTranslator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Translator for GoogleFreeTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslateError> {
        let source = normalize_language_code(source_lang);
        let target = normalize_language_code(target_lang);

        let response = self
            .client
            .post(GOOGLE_TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
            ])
            .form(&[("q", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Api {
                provider: "Google Translate".into(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let data: Value = response.json().await?;
        parse_response(&data)
    }

    fn name(&self) -> String {
        NAME.to_string()
    }
}

/// Map site locale codes to the codes the endpoint expects.
pub fn normalize_language_code(lang: &str) -> String {
    match lang.to_lowercase().as_str() {
        "ko" => "ko".into(),
        "en" => "en".into(),
        "ja" => "ja".into(),
        "zh" | "zh-cn" => "zh-CN".into(),
        "zh-tw" => "zh-TW".into(),
        _ => lang.to_string(),
    }
}

/// Join the first element of every sentence in `data[0]`.
pub fn parse_response(data: &Value) -> Result<String, TranslateError> {
    let sentences = data
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::InvalidResponse(NAME.into()))?;

    Ok(sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .collect())
}
