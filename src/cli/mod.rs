mod app;
mod extras;
mod post;
mod tools;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use inquire::InquireError;
use tracing::{info, warn};

use crate::config::{AppConfig, CONFIG_FILE};
use crate::core::evidence::PubMedClient;
use crate::core::llm::providers::GeminiProvider;
use crate::core::memory::{
    InMemoryKeyValueStore, KeyValueStore, PersistenceStore, SqliteKeyValueStore,
};
use crate::core::terminal::{self, GuideSection, print_status, print_warn};
use crate::core::workspace::Workspace;
use crate::logging::{LOG_FILE, init_logging};
use crate::platform::{NativePlatform, Platform};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Usage")
        .command("medisocial", "Open the interactive content studio")
        .command("medisocial paths", "Show where config, logs and data live")
        .command("medisocial help", "Show this help")
        .print();

    GuideSection::new("Tools")
        .command("Create Post", "Instagram feed/story post with image")
        .command("Medical Blog", "SEO article, convertible into a post")
        .command("Infographic", "Structured infographic with illustrations")
        .command("Conversion", "Objection handling for hesitant patients")
        .command("Trends", "Seasonal topics to start a post from")
        .command("Evidence Finder", "Latest PubMed articles for a query")
        .command("RTS Calculator", "Return-to-sport readiness score")
        .command("CFM Compliance", "Advertising rules for medical posts")
        .print();
    println!();
}

fn print_paths(data_dir: &Path) {
    print_status("Data directory", &data_dir.display().to_string());
    print_status("Config", &data_dir.join(CONFIG_FILE).display().to_string());
    print_status("Log", &data_dir.join(LOG_FILE).display().to_string());
}

/// Esc goes back one level instead of leaving the program.
pub(crate) fn optional<T>(answer: Result<T, InquireError>) -> Result<Option<T>> {
    match answer {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Select one value of a small enum by its label.
pub(crate) fn pick<T: Copy + PartialEq>(
    message: &str,
    all: &[T],
    label: fn(T) -> &'static str,
    current: T,
) -> Result<Option<T>> {
    let labels: Vec<&'static str> = all.iter().map(|v| label(*v)).collect();
    let cursor = all.iter().position(|v| *v == current).unwrap_or(0);
    let Some(choice) = optional(
        inquire::Select::new(message, labels)
            .with_starting_cursor(cursor)
            .prompt(),
    )?
    else {
        return Ok(None);
    };
    Ok(all.iter().copied().find(|v| label(*v) == choice))
}

/// Row number of the chosen option, so rows with identical labels stay
/// distinct.
pub(crate) fn pick_index<T: std::fmt::Display>(
    select: inquire::Select<'_, T>,
) -> Result<Option<usize>> {
    Ok(optional(select.raw_prompt())?.map(|choice| choice.index))
}

/// Free text that must not be blank; re-asks until it is filled or cancelled.
pub(crate) fn required_text(message: &str, initial: &str, help: &str) -> Result<Option<String>> {
    loop {
        let answer = optional(
            inquire::Text::new(message)
                .with_initial_value(initial)
                .with_help_message(help)
                .prompt(),
        )?;
        match answer {
            Some(text) if text.trim().is_empty() => print_warn("This field is required."),
            other => return Ok(other),
        }
    }
}

async fn open_store(data_dir: &Path) -> PersistenceStore {
    let medium: Arc<dyn KeyValueStore> = match SqliteKeyValueStore::open(data_dir).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Falling back to in-memory store: {}", e);
            print_warn("Could not open the local database; nothing will be saved this session.");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };
    PersistenceStore::new(medium)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let data_dir = NativePlatform::data_dir();

    match args.get(1).map(String::as_str) {
        Some("help") | Some("--help") | Some("-h") => {
            print_help();
            return Ok(());
        }
        Some("paths") => {
            print_paths(&data_dir);
            return Ok(());
        }
        Some(other) => {
            terminal::print_error(&format!("Unknown command '{}'.", other));
            print_help();
            return Ok(());
        }
        None => {}
    }

    tokio::fs::create_dir_all(&data_dir).await?;
    NativePlatform::restrict_dir_permissions(&data_dir);
    let config = AppConfig::load(&data_dir).await?;
    init_logging(&data_dir, &config.log_level)?;
    info!("{}", config.summary());

    terminal::print_banner();
    if !config.has_api_key() {
        print_warn(&format!(
            "No Gemini API key found. Set gemini.api_key in {} or export {}.",
            data_dir.join(CONFIG_FILE).display(),
            crate::config::API_KEY_ENV
        ));
        println!(
            "  {}\n",
            style("Generation tools will report an error until a key is configured.").dim()
        );
    }

    let store = open_store(&data_dir).await;
    let service = Arc::new(GeminiProvider::new(
        config.gemini.clone(),
        config.content_language.clone(),
    ));
    let evidence = Arc::new(PubMedClient::new(config.pubmed.clone()));
    let mut workspace = Workspace::open(&config, service, evidence, store).await;

    app::run(&mut workspace).await
}
