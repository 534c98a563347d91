use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::generation::MergeGuard;

pub const CONFIG_FILE: &str = "config.toml";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Language the generated copy is written in.
    #[serde(default = "default_content_language")]
    pub content_language: String,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub pubmed: PubMedConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    /// File the values came from; `None` when running on defaults.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PubMedConfig {
    #[serde(default = "default_pubmed_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_display_secs")]
    pub display_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub merge_guard: MergeGuard,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_content_language() -> String {
    "Brazilian Portuguese".to_string()
}
fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}
fn default_pubmed_base_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}
fn default_max_results() -> usize {
    5
}
fn default_display_secs() -> u64 {
    3
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            content_language: default_content_language(),
            gemini: GeminiConfig::default(),
            pubmed: PubMedConfig::default(),
            notifications: NotificationConfig::default(),
            generation: GenerationConfig::default(),
            loaded_from: None,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            text_model: default_text_model(),
            image_model: default_image_model(),
        }
    }
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            base_url: default_pubmed_base_url(),
            max_results: default_max_results(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            display_secs: default_display_secs(),
        }
    }
}

impl NotificationConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_secs(self.display_secs)
    }
}

impl AppConfig {
    pub async fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let config_path = data_dir.as_ref().join(CONFIG_FILE);
        let mut config = if config_path.exists() {
            let content = tokio::fs::read_to_string(&config_path).await?;
            let mut config = toml::from_str::<AppConfig>(&content)
                .with_context(|| format!("invalid config file {}", config_path.display()))?;
            config.loaded_from = Some(config_path);
            config
        } else {
            Self::default()
        };

        if config.gemini.api_key.trim().is_empty()
            && let Ok(key) = std::env::var(API_KEY_ENV)
        {
            config.gemini.api_key = key;
        }

        Ok(config)
    }

    /// One line for the log once the subscriber is installed.
    pub fn summary(&self) -> String {
        let source = match &self.loaded_from {
            Some(path) => format!("Loaded config from {}", path.display()),
            None => format!("No {} found, using defaults", CONFIG_FILE),
        };
        format!(
            "{}: text_model={}, image_model={}, merge_guard={:?}",
            source, self.gemini.text_model, self.gemini.image_model, self.generation.merge_guard
        )
    }

    pub fn has_api_key(&self) -> bool {
        !self.gemini.api_key.trim().is_empty()
    }
}
