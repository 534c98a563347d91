use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    Post,
    Article,
    Infographic,
    Conversion,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Post => "post",
            ToolKind::Article => "article",
            ToolKind::Infographic => "infographic",
            ToolKind::Conversion => "conversion",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostCategory {
    #[default]
    Pathology,
    Surgery,
    Sports,
    Rehab,
    Lifestyle,
    Myths,
}

impl PostCategory {
    pub const ALL: [PostCategory; 6] = [
        PostCategory::Pathology,
        PostCategory::Surgery,
        PostCategory::Sports,
        PostCategory::Rehab,
        PostCategory::Lifestyle,
        PostCategory::Myths,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PostCategory::Pathology => "Conditions",
            PostCategory::Surgery => "Surgery",
            PostCategory::Sports => "Sports",
            PostCategory::Rehab => "Rehabilitation",
            PostCategory::Lifestyle => "Lifestyle",
            PostCategory::Myths => "Myths",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    #[default]
    Professional,
    Educational,
    Empathetic,
    Motivational,
    Viral,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Educational,
        Tone::Empathetic,
        Tone::Motivational,
        Tone::Viral,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Educational => "Educational",
            Tone::Empathetic => "Empathetic",
            Tone::Motivational => "Motivational",
            Tone::Viral => "Viral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostFormat {
    #[default]
    Feed,
    Story,
}

impl PostFormat {
    pub const ALL: [PostFormat; 2] = [PostFormat::Feed, PostFormat::Story];

    pub fn aspect_ratio(self) -> &'static str {
        match self {
            PostFormat::Feed => "4:5",
            PostFormat::Story => "9:16",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostFormat::Feed => "Feed (4:5)",
            PostFormat::Story => "Story (9:16)",
        }
    }
}

/// Where a post request came from. Drives which wizard step opens
/// first and how the form presents the seeded instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestOrigin {
    #[default]
    Manual,
    TrendSuggested,
    ArticleDerived,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    pub topic: String,
    pub category: PostCategory,
    pub tone: Tone,
    pub format: PostFormat,
    #[serde(default)]
    pub custom_instructions: String,
    /// User-supplied image as a data URL.
    #[serde(default)]
    pub uploaded_image: Option<String>,
    #[serde(default)]
    pub origin: RequestOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArticleAudience {
    #[default]
    Patients,
    Athletes,
    Physicians,
}

impl ArticleAudience {
    pub const ALL: [ArticleAudience; 3] = [
        ArticleAudience::Patients,
        ArticleAudience::Athletes,
        ArticleAudience::Physicians,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArticleAudience::Patients => "Patients",
            ArticleAudience::Athletes => "Athletes",
            ArticleAudience::Physicians => "Physicians",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub audience: ArticleAudience,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicRequest {
    pub topic: String,
    pub category: PostCategory,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRequest {
    pub procedure: String,
    #[serde(default)]
    pub objection: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostContent {
    pub headline: String,
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub image_prompt_description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResult {
    pub id: String,
    pub date: String,
    pub content: PostContent,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_custom_image: bool,
}

static LAST_RESULT_ID: AtomicU64 = AtomicU64::new(0);

/// Millisecond-epoch identifier that never repeats or goes backwards within
/// one process, even when two results are created in the same millisecond.
pub fn next_result_id() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_RESULT_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_RESULT_ID.compare_exchange_weak(
            last,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return candidate,
            Err(actual) => last = actual,
        }
    }
}

impl GeneratedResult {
    pub fn new(content: PostContent, image_url: Option<String>, is_custom_image: bool) -> Self {
        Self {
            id: next_result_id().to_string(),
            date: Utc::now().to_rfc3339(),
            content,
            image_url,
            is_custom_image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedArticle {
    pub title: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub sections: Vec<ArticleSection>,
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicPoint {
    pub label: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnatomyPanel {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicData {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub key_points: Vec<InfographicPoint>,
    #[serde(default)]
    pub hero_image_prompt: Option<String>,
    #[serde(default)]
    pub anatomy: Option<AnatomyPanel>,
    #[serde(default)]
    pub footer_note: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfographicResult {
    pub data: InfographicData,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    #[serde(default)]
    pub anatomy_image_url: Option<String>,
}

impl InfographicResult {
    pub fn from_payload(data: InfographicData) -> Self {
        Self {
            data,
            hero_image_url: None,
            anatomy_image_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub headline: String,
    #[serde(default)]
    pub objection_reframe: String,
    #[serde(default)]
    pub talking_points: Vec<String>,
    #[serde(default)]
    pub call_to_action: String,
    #[serde(default)]
    pub message_script: String,
}
