use anyhow::Result;
use console::style;
use inquire::{CustomType, Select, Text};

use super::{optional, pick_index};
use crate::core::bridge::curated_trends;
use crate::core::compliance::{self, RESOLUTION};
use crate::core::rts::{RtsMetrics, RtsStatus};
use crate::core::terminal::{
    GuideSection, LOOKING_GLASS, print_error, print_heading, print_info, print_link,
    print_success,
};
use crate::core::workspace::Workspace;

/// `YYYY-MM-DD` part of an RFC 3339 timestamp.
fn short_date(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}

pub async fn history(ws: &mut Workspace) -> Result<()> {
    let entries = ws.post.history().await;
    if entries.is_empty() {
        print_info("No posts yet. Create one and it will show up here.");
        return Ok(());
    }
    let labels: Vec<String> = entries
        .iter()
        .map(|e| format!("{}  {}", short_date(&e.date), e.content.headline))
        .collect();
    let Some(index) = pick_index(Select::new("Open a saved post:", labels).with_page_size(10))?
    else {
        return Ok(());
    };
    if ws.open_history_entry(&entries[index].id).await.is_none() {
        print_error("That post can't be opened while a new one is being generated.");
    }
    Ok(())
}

pub async fn trends(ws: &mut Workspace) -> Result<()> {
    let trends = curated_trends();
    let labels: Vec<String> = trends
        .iter()
        .map(|t| {
            format!(
                "{}: {}",
                t.label,
                t.topic.as_deref().unwrap_or_default()
            )
        })
        .collect();
    if let Some(index) = pick_index(Select::new("Trending now:", labels))? {
        ws.use_trend(trends[index].clone()).await;
    }
    Ok(())
}

pub async fn evidence(ws: &mut Workspace) -> Result<()> {
    loop {
        let Some(query) = optional(
            Text::new("Search PubMed:")
                .with_help_message("e.g. 'ACL reconstruction return to sport' (Esc to go back)")
                .prompt(),
        )?
        else {
            return Ok(());
        };
        if query.trim().is_empty() {
            continue;
        }
        println!("{} Searching...", LOOKING_GLASS);
        let articles = ws.search_evidence(&query).await;
        if articles.is_empty() {
            print_info("No articles found.");
            continue;
        }
        for article in &articles {
            print_heading(&article.title);
            let authors = match article.authors.len() {
                0 => String::new(),
                1..=3 => article.authors.join(", "),
                _ => format!("{} et al.", article.authors[0]),
            };
            println!(
                "  {} {} {}",
                style(&article.source).italic(),
                article.pubdate,
                style(authors).dim()
            );
            print_link("PubMed", &article.url);
        }
    }
}

fn ask_metric(label: &str, current: f64, help: &str) -> Result<Option<f64>> {
    optional(
        CustomType::<f64>::new(label)
            .with_default(current)
            .with_help_message(help)
            .prompt(),
    )
}

fn ask_metrics(mut metrics: RtsMetrics) -> Result<Option<RtsMetrics>> {
    let Some(limb) = ask_metric(
        "Limb symmetry (%)",
        metrics.limb_symmetry,
        "Quadriceps strength index",
    )?
    else {
        return Ok(None);
    };
    let Some(pain) = ask_metric("Pain (0-10)", metrics.pain_score, "During sport-specific drills")?
    else {
        return Ok(None);
    };
    let Some(extension) = ask_metric(
        "Extension deficit (°)",
        metrics.rom_extension,
        "0 means full extension",
    )?
    else {
        return Ok(None);
    };
    let Some(flexion) = ask_metric("Flexion (°)", metrics.rom_flexion, "Active knee flexion")?
    else {
        return Ok(None);
    };
    let Some(hop) = ask_metric("Hop test (%)", metrics.hop_test, "Single-leg hop symmetry")? else {
        return Ok(None);
    };
    let Some(readiness) = ask_metric(
        "ACL-RSI (%)",
        metrics.psychological_readiness,
        "Psychological readiness",
    )?
    else {
        return Ok(None);
    };
    metrics.limb_symmetry = limb;
    metrics.pain_score = pain;
    metrics.rom_extension = extension;
    metrics.rom_flexion = flexion;
    metrics.hop_test = hop;
    metrics.psychological_readiness = readiness;
    Ok(Some(metrics))
}

fn print_score(metrics: &RtsMetrics) {
    let score = metrics.score();
    let status = metrics.status();
    let styled = match status {
        RtsStatus::Cleared => style(format!("{}% {}", score, status.label())).green(),
        RtsStatus::Training => style(format!("{}% {}", score, status.label())).yellow(),
        RtsStatus::NotCleared => style(format!("{}% {}", score, status.label())).red(),
    };
    println!("\n  {} {}\n", style("RTS score:").bold(), styled.bold());
}

pub async fn calculator(ws: &mut Workspace) -> Result<()> {
    let mut metrics = RtsMetrics::default();
    loop {
        print_score(&metrics);
        let options = vec!["Adjust metrics", "Save assessment", "Show saved assessments", "Back"];
        match optional(Select::new("RTS Calculator:", options).prompt())? {
            Some("Adjust metrics") => {
                if let Some(updated) = ask_metrics(metrics.clone())? {
                    metrics = updated;
                }
            }
            Some("Save assessment") => {
                let Some(name) = optional(
                    Text::new("Patient name:")
                        .with_initial_value(&metrics.patient_name)
                        .prompt(),
                )?
                else {
                    continue;
                };
                metrics.patient_name = name;
                match ws.rts.save(&metrics).await {
                    Ok(entry) => print_success(&format!(
                        "Saved {} ({}%).",
                        entry.patient_name, entry.score
                    )),
                    Err(e) => print_error(&e.to_string()),
                }
            }
            Some("Show saved assessments") => {
                let entries = ws.rts.entries().await;
                if entries.is_empty() {
                    print_info("No saved assessments.");
                }
                for entry in entries {
                    println!(
                        "  {}  {:<24} {}%",
                        short_date(&entry.date),
                        entry.patient_name,
                        entry.score
                    );
                }
            }
            _ => return Ok(()),
        }
    }
}

pub fn compliance() {
    print_heading("Medical advertising compliance");
    println!("  {}", style(RESOLUTION).dim());
    for section in compliance::guide() {
        let title = format!("{} {}", section.article, section.title);
        let mut guide = GuideSection::new(&title);
        for rule in section.rules {
            guide = guide.command(rule.kind.label(), rule.text);
        }
        guide.print();
    }
    println!(
        "\n  {}\n",
        style("Generated posts are written to follow these rules.").dim()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_date_truncates_timestamps() {
        assert_eq!(short_date("2025-03-04T10:00:00+00:00"), "2025-03-04");
        assert_eq!(short_date("today"), "today");
    }
}
