//! Conversions from one tool's output into a pre-filled post request. The
//! request only seeds the post wizard; submitting it stays a user action.

use serde::{Deserialize, Serialize};

use crate::core::generation::types::{
    GeneratedArticle, PostCategory, PostFormat, PostRequest, RequestOrigin, Tone,
};

/// Partial post request proposed by the trend source. Absent fields take the
/// post defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSuggestion {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub category: Option<PostCategory>,
    #[serde(default)]
    pub tone: Option<Tone>,
    #[serde(default)]
    pub format: Option<PostFormat>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

pub fn article_to_post_request(article: &GeneratedArticle) -> PostRequest {
    PostRequest {
        topic: article.title.clone(),
        category: PostCategory::Pathology,
        tone: Tone::Educational,
        format: PostFormat::Feed,
        custom_instructions: format!(
            "Base the post EXACTLY on this article: \"{}\". Summarize its main points for Instagram.",
            article.title
        ),
        uploaded_image: None,
        origin: RequestOrigin::ArticleDerived,
    }
}

pub fn trend_to_post_request(trend: TrendSuggestion) -> PostRequest {
    PostRequest {
        topic: trend.topic.unwrap_or_default(),
        category: trend.category.unwrap_or(PostCategory::Pathology),
        tone: trend.tone.unwrap_or(Tone::Professional),
        format: trend.format.unwrap_or(PostFormat::Feed),
        custom_instructions: trend.custom_instructions.unwrap_or_default(),
        uploaded_image: None,
        origin: RequestOrigin::TrendSuggested,
    }
}

fn trend(
    label: &str,
    topic: &str,
    category: PostCategory,
    tone: Option<Tone>,
    format: Option<PostFormat>,
    instructions: &str,
) -> TrendSuggestion {
    TrendSuggestion {
        label: label.to_string(),
        topic: Some(topic.to_string()),
        category: Some(category),
        tone,
        format,
        custom_instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
    }
}

/// Seasonal knee-care themes with steady search interest.
pub fn curated_trends() -> Vec<TrendSuggestion> {
    vec![
        trend(
            "Running season",
            "Runner's knee: pain in front of the knee when training",
            PostCategory::Sports,
            Some(Tone::Educational),
            None,
            "Focus on load management and when to see a specialist.",
        ),
        trend(
            "Football on weekends",
            "ACL tear in amateur football players",
            PostCategory::Sports,
            Some(Tone::Viral),
            Some(PostFormat::Story),
            "",
        ),
        trend(
            "New year, new habits",
            "Strengthening exercises that protect knees with arthritis",
            PostCategory::Rehab,
            Some(Tone::Motivational),
            None,
            "",
        ),
        trend(
            "Myth of the week",
            "Does cracking in the knee mean arthritis?",
            PostCategory::Myths,
            None,
            None,
            "Open with the myth, then debunk it with evidence.",
        ),
        trend(
            "Surgery questions",
            "How long is recovery after meniscus surgery",
            PostCategory::Surgery,
            Some(Tone::Empathetic),
            None,
            "",
        ),
        trend(
            "Weight and joints",
            "How body weight affects knee cartilage",
            PostCategory::Lifestyle,
            None,
            None,
            "",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_title_becomes_topic_and_is_quoted_in_instructions() {
        let article = GeneratedArticle {
            title: "Patellar Tendinopathy in Jumpers".into(),
            ..Default::default()
        };
        let request = article_to_post_request(&article);
        assert_eq!(request.topic, article.title);
        assert!(
            request
                .custom_instructions
                .contains("\"Patellar Tendinopathy in Jumpers\"")
        );
        assert_eq!(request.category, PostCategory::Pathology);
        assert_eq!(request.tone, Tone::Educational);
        assert_eq!(request.format, PostFormat::Feed);
        assert_eq!(request.origin, RequestOrigin::ArticleDerived);
    }

    #[test]
    fn empty_trend_is_filled_with_defaults() {
        let request = trend_to_post_request(TrendSuggestion::default());
        assert_eq!(request.topic, "");
        assert_eq!(request.category, PostCategory::Pathology);
        assert_eq!(request.tone, Tone::Professional);
        assert_eq!(request.format, PostFormat::Feed);
        assert_eq!(request.custom_instructions, "");
        assert_eq!(request.origin, RequestOrigin::TrendSuggested);
    }

    #[test]
    fn trend_fields_override_defaults() {
        let request = trend_to_post_request(TrendSuggestion {
            topic: Some("ACL".into()),
            tone: Some(Tone::Viral),
            format: Some(PostFormat::Story),
            ..Default::default()
        });
        assert_eq!(request.topic, "ACL");
        assert_eq!(request.tone, Tone::Viral);
        assert_eq!(request.format, PostFormat::Story);
        assert_eq!(request.category, PostCategory::Pathology);
    }

    #[test]
    fn curated_trends_all_have_topics() {
        let trends = curated_trends();
        assert!(!trends.is_empty());
        assert!(
            trends
                .iter()
                .all(|t| t.topic.as_deref().is_some_and(|s| !s.is_empty()))
        );
    }
}
