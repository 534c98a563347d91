pub mod prompts;
pub mod providers;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::generation::types::{
    ArticleRequest, ConversionRequest, ConversionResult, GeneratedArticle, InfographicData,
    InfographicRequest, PostContent, PostFormat, PostRequest,
};

/// The generative-content capability every tool coordinator calls into.
/// Implementations report any network or service problem as an error; callers
/// treat all of them as "generation failed".
#[async_trait]
pub trait GenerativeService: Send + Sync {
    async fn generate_post_text(&self, request: &PostRequest) -> Result<PostContent>;

    /// Returns a media reference (data URL or remote URL).
    async fn generate_image(&self, prompt: &str, format: PostFormat) -> Result<String>;

    async fn generate_article(&self, request: &ArticleRequest) -> Result<GeneratedArticle>;

    /// Structured infographic payload, including the prompts for its illustrations.
    async fn generate_infographic(&self, request: &InfographicRequest) -> Result<InfographicData>;

    async fn generate_conversion(&self, request: &ConversionRequest) -> Result<ConversionResult>;

    async fn refine_text(&self, text: &str, instruction: &str) -> Result<String>;
}
