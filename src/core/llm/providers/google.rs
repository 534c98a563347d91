use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GeminiConfig;
use crate::core::generation::types::{
    ArticleRequest, ConversionRequest, ConversionResult, GeneratedArticle, InfographicData,
    InfographicRequest, PostContent, PostFormat, PostRequest,
};
use crate::core::llm::{GenerativeService, prompts};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<ImageConfig>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageConfig {
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiResContent,
}

#[derive(Deserialize)]
struct GeminiResContent {
    #[serde(default)]
    parts: Vec<GeminiResPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResPart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    language: String,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, language: impl Into<String>) -> Self {
        Self {
            config,
            language: language.into(),
            client: Client::new(),
        }
    }

    fn user_turn(prompt: String) -> GeminiContent {
        GeminiContent {
            role: "user".to_string(),
            parts: vec![GeminiPart { text: prompt }],
        }
    }

    async fn call(&self, model_id: &str, req: &GeminiRequest) -> Result<Vec<GeminiResPart>> {
        if self.config.api_key.trim().is_empty() {
            return Err(anyhow!(
                "No Gemini API key configured. Set gemini.api_key in config.toml."
            ));
        }
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model_id
        );
        debug!("Gemini request to {}", model_id);
        let res = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(req)
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(anyhow!(
                "Google Gemini API Error: {}",
                res.text().await.unwrap_or_default()
            ));
        }
        let parsed: GeminiResponse = res.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts)
            .ok_or_else(|| anyhow!("Gemini returned no candidates"))
    }

    async fn generate_text(&self, prompt: String, json: bool) -> Result<String> {
        let req = GeminiRequest {
            system_instruction: Some(Self::user_turn(prompts::system_instruction(
                &self.language,
            ))),
            contents: vec![Self::user_turn(prompt)],
            generation_config: json.then(|| GenerationConfig {
                response_mime_type: Some("application/json"),
                ..Default::default()
            }),
        };
        let parts = self.call(&self.config.text_model, &req).await?;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(anyhow!("Gemini returned an empty response"));
        }
        Ok(text)
    }

    async fn generate_json<T: DeserializeOwned>(&self, prompt: String) -> Result<T> {
        let text = self.generate_text(prompt, true).await?;
        parse_json_payload(&text)
    }
}

/// Parse a structured payload, tolerating a Markdown code fence around it.
pub(crate) fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(body.trim()).context("Gemini returned malformed JSON")
}

#[async_trait]
impl GenerativeService for GeminiProvider {
    async fn generate_post_text(&self, request: &PostRequest) -> Result<PostContent> {
        self.generate_json(prompts::post_text(request)).await
    }

    async fn generate_image(&self, prompt: &str, format: PostFormat) -> Result<String> {
        let req = GeminiRequest {
            system_instruction: None,
            contents: vec![Self::user_turn(prompts::image(prompt, format))],
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["IMAGE"]),
                image_config: Some(ImageConfig {
                    aspect_ratio: format.aspect_ratio(),
                }),
                ..Default::default()
            }),
        };
        let parts = self.call(&self.config.image_model, &req).await?;
        let image = parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| anyhow!("Gemini returned no image data"))?;
        info!("Generated {} image ({} bytes b64)", image.mime_type, image.data.len());
        Ok(format!("data:{};base64,{}", image.mime_type, image.data))
    }

    async fn generate_article(&self, request: &ArticleRequest) -> Result<GeneratedArticle> {
        self.generate_json(prompts::article(request)).await
    }

    async fn generate_infographic(&self, request: &InfographicRequest) -> Result<InfographicData> {
        self.generate_json(prompts::infographic(request)).await
    }

    async fn generate_conversion(&self, request: &ConversionRequest) -> Result<ConversionResult> {
        self.generate_json(prompts::conversion(request)).await
    }

    async fn refine_text(&self, text: &str, instruction: &str) -> Result<String> {
        let refined = self
            .generate_text(prompts::refine(text, instruction), false)
            .await?;
        Ok(refined.trim().to_string())
    }
}
