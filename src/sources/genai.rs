//! Client for the Google generative-language REST API.
//!
//! Every generation call is a single `generateContent` POST against a
//! model-specific endpoint; nothing here interprets the generated payload
//! beyond the wire envelope. Request shaping (system instruction,
//! temperature, structured-output schema) is exposed as builders on
//! [`GenerateRequest`] so each workflow composes only what it needs.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PharmographError;

const GENAI_BASE: &str = "https://generativelanguage.googleapis.com";
pub(crate) const GENAI_API: &str = "genai";
const GENAI_BASE_ENV: &str = "PHARMOGRAPH_GENAI_BASE";
const GENAI_KEY_ENV: &str = "GEMINI_API_KEY";
const GENAI_KEY_FALLBACK_ENV: &str = "API_KEY";
const GENAI_KEY_DOCS: &str = "https://ai.google.dev/gemini-api/docs/api-key";

pub struct GenAiClient {
    client: reqwest::Client,
    base: Cow<'static, str>,
    api_key: String,
}

impl GenAiClient {
    pub fn new() -> Result<Self, PharmographError> {
        let api_key = std::env::var(GENAI_KEY_ENV)
            .or_else(|_| std::env::var(GENAI_KEY_FALLBACK_ENV))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PharmographError::ApiKeyRequired {
                api: GENAI_API.to_string(),
                env_var: GENAI_KEY_ENV.to_string(),
                docs_url: GENAI_KEY_DOCS.to_string(),
            })?;

        Ok(Self {
            client: crate::sources::shared_client()?,
            base: crate::sources::env_base(GENAI_BASE, GENAI_BASE_ENV),
            api_key,
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(base: String, api_key: &str) -> Result<Self, PharmographError> {
        Ok(Self {
            client: crate::sources::shared_client()?,
            base: Cow::Owned(base),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.base.as_ref().trim_end_matches('/')
        )
    }

    pub(crate) async fn generate(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, PharmographError> {
        let url = self.endpoint(model);
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        let bytes = crate::sources::read_limited_body(resp, GENAI_API).await?;

        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(PharmographError::Api {
                api: GENAI_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        serde_json::from_slice(&bytes).map_err(|source| PharmographError::ApiJson {
            api: GENAI_API.to_string(),
            source,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateRequest {
    pub(crate) fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            system_instruction: None,
            generation_config: None,
        }
    }

    pub(crate) fn with_system_instruction(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(Content::text(instruction));
        self
    }

    pub(crate) fn with_temperature(mut self, temperature: f32) -> Self {
        self.generation_config
            .get_or_insert_with(GenerationConfig::default)
            .temperature = Some(temperature);
        self
    }

    /// Constrains the model to structured JSON output matching `schema`.
    pub(crate) fn with_json_schema(mut self, schema: Value) -> Self {
        let config = self
            .generation_config
            .get_or_insert_with(GenerationConfig::default);
        config.response_mime_type = Some("application/json".to_string());
        config.response_schema = Some(schema);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.into()),
                inline_data: None,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Content,
}

impl GenerateResponse {
    /// Concatenates every text part across candidates, in wire order.
    pub(crate) fn text(&self) -> String {
        self.candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }

    /// First inline binary part, scanning candidates and parts in wire order.
    pub(crate) fn first_inline_data(&self) -> Option<&InlineData> {
        self.candidates
            .iter()
            .flat_map(|c| c.content.parts.iter())
            .find_map(|p| p.inline_data.as_ref())
    }
}
