//! Prompt text for every generation capability. Each builder returns the user
//! turn; `system_instruction` is shared.

use crate::core::generation::types::{
    ArticleRequest, ConversionRequest, InfographicRequest, PostFormat, PostRequest,
};

pub fn system_instruction(language: &str) -> String {
    format!(
        "You are the content strategist of an orthopaedic knee surgery practice. \
         Write accurate, evidence-based patient education in {language}. \
         Never promise results, never show before/after outcomes and never name prices: \
         medical advertising rules forbid it. When asked for JSON, answer with JSON only."
    )
}

pub fn post_text(request: &PostRequest) -> String {
    let mut prompt = format!(
        "Create an Instagram {format} post.\n\
         Category: {category}\n\
         Topic: {topic}\n\
         Tone: {tone}\n",
        format = request.format.label(),
        category = request.category.label(),
        topic = request.topic.trim(),
        tone = request.tone.label(),
    );
    if !request.custom_instructions.trim().is_empty() {
        prompt.push_str(&format!(
            "Extra instructions: {}\n",
            request.custom_instructions.trim()
        ));
    }
    prompt.push_str(
        "Answer with a JSON object with the keys \"headline\" (max 8 words), \
         \"caption\" (up to 1200 characters, short paragraphs, ends with a call to action), \
         \"hashtags\" (array of 8 to 12 strings starting with #) and \
         \"imagePromptDescription\" (one English sentence describing a photorealistic, \
         text-free illustration for the post).",
    );
    prompt
}

pub fn image(prompt: &str, format: PostFormat) -> String {
    format!(
        "{prompt}\nClinical, clean, high-end medical photography style, soft light, \
         no text, no logos, no graphic surgery. Aspect ratio {}.",
        format.aspect_ratio()
    )
}

pub fn article(request: &ArticleRequest) -> String {
    let keywords = if request.keywords.is_empty() {
        "choose the most searched ones".to_string()
    } else {
        request.keywords.join(", ")
    };
    format!(
        "Write an SEO blog article about \"{topic}\" for {audience} in a {tone} tone.\n\
         Target keywords: {keywords}.\n\
         Answer with a JSON object with the keys \"title\", \"metaDescription\" (max 155 characters), \
         \"slug\", \"sections\" (array of {{\"heading\", \"body\"}}, at least 4), \
         \"faq\" (array of {{\"question\", \"answer\"}}, 3 to 5) and \"keywords\" (array of strings).",
        topic = request.topic.trim(),
        audience = request.audience.label(),
        tone = request.tone.label().to_lowercase(),
    )
}

pub fn infographic(request: &InfographicRequest) -> String {
    format!(
        "Design the content of an educational infographic about \"{topic}\" ({category}).\n\
         Answer with a JSON object with the keys \"title\", \"subtitle\", \
         \"keyPoints\" (array of {{\"label\", \"detail\"}}, 4 to 6), \
         \"heroImagePrompt\" (English description of the cover illustration), \
         \"anatomy\" ({{\"title\", \"description\", \"imagePrompt\"}} with an English description of \
         an anatomical diagram, or null when anatomy is irrelevant) and \"footerNote\".",
        topic = request.topic.trim(),
        category = request.category.label(),
    )
}

pub fn conversion(request: &ConversionRequest) -> String {
    let objection = if request.objection.trim().is_empty() {
        "the most common fears patients have about it".to_string()
    } else {
        format!("\"{}\"", request.objection.trim())
    };
    format!(
        "A prospective patient is hesitating about {procedure}. Address {objection} \
         in a {tone} tone, ethically and without pressure.\n\
         Answer with a JSON object with the keys \"headline\", \"objectionReframe\", \
         \"talkingPoints\" (array of strings), \"callToAction\" and \"messageScript\" \
         (a short direct-message reply the practice can send).",
        procedure = request.procedure.trim(),
        tone = request.tone.label().to_lowercase(),
    )
}

pub fn refine(text: &str, instruction: &str) -> String {
    format!(
        "Rewrite the Instagram caption below following this instruction: {instruction}\n\
         Keep the language, keep it compliant with medical advertising rules and answer with \
         the new caption only.\n\n---\n{text}"
    )
}
