use anyhow::Result;
use console::style;
use inquire::{Select, Text};

use super::app::flush_notification;
use super::{optional, pick, required_text};
use crate::core::generation::MergeOutcome;
use crate::core::generation::types::{
    ArticleAudience, ArticleRequest, ConversionRequest, ConversionResult, GeneratedArticle,
    InfographicRequest, InfographicResult, PostCategory, Tone,
};
use crate::core::terminal::{describe_media, print_error, print_heading, print_step, print_warn};
use crate::core::view::Panel;
use crate::core::workspace::Workspace;

const NEW: &str = "Start over";
const SHOW: &str = "Show the current result";
const MENU: &str = "Back to menu";

/// Offered when the editor opens on a tool that already holds a result.
/// `None` leaves the tool.
fn resume_prompt(tool: &str) -> Result<Option<bool>> {
    let options = vec![NEW, SHOW, MENU];
    Ok(match optional(Select::new(tool, options).prompt())? {
        Some(NEW) => Some(false),
        Some(SHOW) => Some(true),
        _ => None,
    })
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn print_article(article: &GeneratedArticle) {
    print_heading(&article.title);
    println!("  {} {}", style("Slug:").bold(), article.slug);
    println!("  {} {}", style("Meta:").bold(), article.meta_description);
    for section in &article.sections {
        println!("\n{}\n{}", style(&section.heading).bold(), section.body);
    }
    if !article.faq.is_empty() {
        print_heading("FAQ");
        for entry in &article.faq {
            println!("  {} {}\n    {}", style("Q:").cyan(), entry.question, entry.answer);
        }
    }
    if !article.keywords.is_empty() {
        println!("\n{}", style(article.keywords.join(", ")).dim());
    }
}

fn article_form() -> Result<Option<ArticleRequest>> {
    let Some(topic) = required_text("Article topic:", "", "e.g. 'ACL reconstruction recovery'")?
    else {
        return Ok(None);
    };
    let Some(keywords) = optional(
        Text::new("Target keywords (comma separated, optional):").prompt(),
    )?
    else {
        return Ok(None);
    };
    let Some(audience) = pick(
        "Audience:",
        &ArticleAudience::ALL,
        ArticleAudience::label,
        ArticleAudience::Patients,
    )?
    else {
        return Ok(None);
    };
    let Some(tone) = pick("Tone:", &Tone::ALL, Tone::label, Tone::Educational)? else {
        return Ok(None);
    };
    Ok(Some(ArticleRequest {
        topic,
        keywords: split_keywords(&keywords),
        audience,
        tone,
    }))
}

pub async fn article(ws: &mut Workspace) -> Result<()> {
    loop {
        match ws.visible_panel().await {
            Panel::Editor => {
                if ws.article.current().await.is_some() {
                    match resume_prompt("Medical Blog")? {
                        Some(true) => {
                            ws.select_panel(Panel::Result);
                            continue;
                        }
                        Some(false) => {}
                        None => return Ok(()),
                    }
                }
                let Some(request) = article_form()? else {
                    return Ok(());
                };
                print_step("Writing the article...");
                if let Err(e) = ws.generate_article(request).await {
                    print_error(&e.to_string());
                }
            }
            Panel::Result => {
                let Some(current) = ws.article.current().await else {
                    ws.select_panel(Panel::Editor);
                    continue;
                };
                print_article(&current);
                let options = vec!["Turn into an Instagram post", NEW, MENU];
                match optional(Select::new("Article actions:", options).prompt())? {
                    Some("Turn into an Instagram post") => {
                        ws.article_to_post(&current).await;
                        return Ok(());
                    }
                    Some(NEW) => ws.select_panel(Panel::Editor),
                    _ => return Ok(()),
                }
            }
        }
        flush_notification(ws);
    }
}

fn print_infographic(result: &InfographicResult) {
    let data = &result.data;
    print_heading(&data.title);
    if !data.subtitle.is_empty() {
        println!("{}", style(&data.subtitle).italic());
    }
    for point in &data.key_points {
        println!("  {} {}: {}", style("•").cyan(), style(&point.label).bold(), point.detail);
    }
    if let Some(anatomy) = &data.anatomy {
        println!("\n{}\n{}", style(&anatomy.title).bold(), anatomy.description);
    }
    if !data.footer_note.is_empty() {
        println!("\n{}", style(&data.footer_note).dim());
    }
    if data.hero_image_prompt.is_some() {
        println!(
            "\n  {} {}",
            style("Cover:").bold(),
            describe_media(result.hero_image_url.as_deref())
        );
    }
    if data.anatomy.as_ref().is_some_and(|a| a.image_prompt.is_some()) {
        println!(
            "  {} {}",
            style("Anatomy:").bold(),
            describe_media(result.anatomy_image_url.as_deref())
        );
    }
}

pub async fn infographic(ws: &mut Workspace) -> Result<()> {
    loop {
        match ws.visible_panel().await {
            Panel::Editor => {
                if ws.infographic.current().await.is_some() {
                    match resume_prompt("Infographic")? {
                        Some(true) => {
                            ws.select_panel(Panel::Result);
                            continue;
                        }
                        Some(false) => {}
                        None => return Ok(()),
                    }
                }
                let Some(topic) =
                    required_text("Infographic topic:", "", "e.g. 'Stages of knee arthritis'")?
                else {
                    return Ok(());
                };
                let Some(category) = pick(
                    "Category:",
                    &PostCategory::ALL,
                    PostCategory::label,
                    PostCategory::Pathology,
                )?
                else {
                    return Ok(());
                };
                print_step("Structuring the infographic...");
                match ws
                    .generate_infographic(InfographicRequest { topic, category })
                    .await
                {
                    Ok((base, pending)) => {
                        print_infographic(&base);
                        flush_notification(ws);
                        if !pending.is_empty() {
                            print_step(&format!("Drawing {} illustration(s)...", pending.len()));
                            for (slot, outcome) in pending.settled().await {
                                if outcome == MergeOutcome::Failed {
                                    print_warn(&format!("The {:?} illustration failed.", slot));
                                }
                            }
                        }
                    }
                    Err(e) => print_error(&e.to_string()),
                }
            }
            Panel::Result => {
                let Some(current) = ws.infographic.current().await else {
                    ws.select_panel(Panel::Editor);
                    continue;
                };
                print_infographic(&current);
                let options = vec!["Discard this infographic", NEW, MENU];
                match optional(Select::new("Infographic actions:", options).prompt())? {
                    Some("Discard this infographic") => {
                        ws.infographic.clear().await;
                        ws.select_panel(Panel::Editor);
                    }
                    Some(NEW) => ws.select_panel(Panel::Editor),
                    _ => return Ok(()),
                }
            }
        }
        flush_notification(ws);
    }
}

fn print_conversion(result: &ConversionResult) {
    print_heading(&result.headline);
    println!("{}\n", result.objection_reframe);
    for point in &result.talking_points {
        println!("  {} {}", style("•").cyan(), point);
    }
    println!("\n{} {}", style("Call to action:").bold(), result.call_to_action);
    if !result.message_script.is_empty() {
        print_heading("Message script");
        println!("{}", result.message_script);
    }
}

pub async fn conversion(ws: &mut Workspace) -> Result<()> {
    loop {
        match ws.visible_panel().await {
            Panel::Editor => {
                if ws.conversion.current().await.is_some() {
                    match resume_prompt("Conversion")? {
                        Some(true) => {
                            ws.select_panel(Panel::Result);
                            continue;
                        }
                        Some(false) => {}
                        None => return Ok(()),
                    }
                }
                let Some(procedure) =
                    required_text("Procedure:", "", "e.g. 'Total knee replacement'")?
                else {
                    return Ok(());
                };
                let Some(objection) = optional(
                    Text::new("Patient's objection (optional):")
                        .with_help_message("e.g. 'I'm afraid of the pain after surgery'")
                        .prompt(),
                )?
                else {
                    return Ok(());
                };
                let Some(tone) = pick("Tone:", &Tone::ALL, Tone::label, Tone::Empathetic)? else {
                    return Ok(());
                };
                print_step("Building the conversion strategy...");
                let request = ConversionRequest {
                    procedure,
                    objection,
                    tone,
                };
                if let Err(e) = ws.generate_conversion(request).await {
                    print_error(&e.to_string());
                }
            }
            Panel::Result => {
                let Some(current) = ws.conversion.current().await else {
                    ws.select_panel(Panel::Editor);
                    continue;
                };
                print_conversion(&current);
                let options = vec![NEW, MENU];
                match optional(Select::new("Conversion actions:", options).prompt())? {
                    Some(NEW) => ws.select_panel(Panel::Editor),
                    _ => return Ok(()),
                }
            }
        }
        flush_notification(ws);
    }
}
