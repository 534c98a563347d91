use std::path::Path;

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use console::style;
use inquire::{Confirm, Select, Text};

use super::{optional, pick, required_text};
use crate::core::generation::ToolStatus;
use crate::core::generation::types::{
    GeneratedResult, PostCategory, PostFormat, PostRequest, RequestOrigin, Tone,
};
use crate::core::terminal::{
    describe_media, print_error, print_heading, print_info, print_step, print_success,
};
use crate::core::view::Panel;
use crate::core::workspace::Workspace;

const STEPS: u8 = 3;

/// One-click caption refinements: (menu label, instruction sent to the model).
const REFINE_PRESETS: [(&str, &str); 4] = [
    ("Shorten", "Make it shorter"),
    ("More empathy", "Make it more empathetic"),
    ("Add emojis", "Add emojis"),
    ("Plain language", "Use plain language a layperson understands"),
];
const CUSTOM_REFINE: &str = "Write your own instruction...";

fn preset_instruction(label: &str) -> Option<&'static str> {
    REFINE_PRESETS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, instruction)| *instruction)
}

/// `Ok(None)` when the user backs out.
fn ask_refinement() -> Result<Option<String>> {
    let mut options: Vec<&str> = REFINE_PRESETS.iter().map(|(label, _)| *label).collect();
    options.push(CUSTOM_REFINE);
    let Some(choice) = optional(Select::new("Refine caption:", options).prompt())? else {
        return Ok(None);
    };
    if let Some(instruction) = preset_instruction(choice) {
        return Ok(Some(instruction.to_string()));
    }
    optional(
        Text::new("How should the caption change?")
            .with_help_message("e.g. 'mention the recovery time'")
            .prompt(),
    )
}

/// Seeded requests skip straight to the review step, unless they still lack
/// a topic.
fn starting_step(request: &PostRequest) -> u8 {
    match request.origin {
        RequestOrigin::Manual => 1,
        _ if request.topic.trim().is_empty() => 2,
        RequestOrigin::TrendSuggested | RequestOrigin::ArticleDerived => STEPS,
    }
}

/// Where the wizard goes after `step`. Backing out always walks down to
/// step 1, wherever the wizard opened; `None` leaves it.
fn next_step(step: u8, advanced: bool) -> Option<u8> {
    if advanced {
        Some(step + 1)
    } else if step <= 1 {
        None
    } else {
        Some(step - 1)
    }
}

/// Reads a local image into a data URL so it can travel inside the request
/// and the saved history.
pub(crate) fn image_data_url(path: &Path) -> Result<String> {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    if mime.type_() != mime_guess::mime::IMAGE {
        return Err(anyhow!("{} is not an image ({})", path.display(), mime));
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn ask_upload(request: &mut PostRequest) -> Result<()> {
    let label = if request.uploaded_image.is_some() {
        "Replace your uploaded image?"
    } else {
        "Use your own photo instead of a generated image?"
    };
    let Some(upload) = optional(Confirm::new(label).with_default(false).prompt())? else {
        return Ok(());
    };
    if !upload {
        return Ok(());
    }
    let Some(path) = optional(Text::new("Path to the image:").prompt())? else {
        return Ok(());
    };
    match image_data_url(Path::new(path.trim())) {
        Ok(url) => {
            request.uploaded_image = Some(url);
            print_success("Image attached.");
        }
        Err(e) => print_error(&e.to_string()),
    }
    Ok(())
}

/// Three-step form. `Ok(None)` when the user backs out of the first step.
fn run_wizard(mut request: PostRequest) -> Result<Option<PostRequest>> {
    let mut step = starting_step(&request);
    loop {
        println!(
            "\n  {}",
            style(format!("Step {} of {}", step, STEPS)).dim()
        );
        let advanced = match step {
            1 => match pick("Format:", &PostFormat::ALL, PostFormat::label, request.format)? {
                Some(format) => {
                    request.format = format;
                    ask_upload(&mut request)?;
                    true
                }
                None => false,
            },
            2 => {
                match pick(
                    "Category:",
                    &PostCategory::ALL,
                    PostCategory::label,
                    request.category,
                )? {
                    Some(category) => {
                        request.category = category;
                        match required_text(
                            "Topic:",
                            &request.topic,
                            "e.g. 'Meniscus tear in runners'",
                        )? {
                            Some(topic) => {
                                request.topic = topic;
                                true
                            }
                            None => false,
                        }
                    }
                    None => false,
                }
            }
            _ => {
                if !request.custom_instructions.is_empty() {
                    print_info(&format!("Instructions: {}", request.custom_instructions));
                }
                match pick("Tone:", &Tone::ALL, Tone::label, request.tone)? {
                    Some(tone) => {
                        request.tone = tone;
                        if request.origin != RequestOrigin::Manual {
                            ask_upload(&mut request)?;
                        }
                        match review(&request)? {
                            Review::Generate => return Ok(Some(request)),
                            Review::Edit => {
                                step = 1;
                                continue;
                            }
                            Review::Back => false,
                        }
                    }
                    None => false,
                }
            }
        };

        match next_step(step, advanced) {
            Some(next) => step = next,
            None => return Ok(None),
        }
    }
}

enum Review {
    Generate,
    Edit,
    Back,
}

fn review(request: &PostRequest) -> Result<Review> {
    print_heading("Review");
    println!("  Topic:    {}", style(request.topic.trim()).bold());
    println!("  Category: {}", request.category.label());
    println!("  Tone:     {}", request.tone.label());
    println!("  Format:   {}", request.format.label());
    if request.uploaded_image.is_some() {
        println!("  Image:    your upload");
    }
    let options = vec!["Generate post", "Edit everything", "Back"];
    let choice = optional(Select::new("Ready?", options).prompt())?;
    Ok(match choice {
        Some("Generate post") => Review::Generate,
        Some("Edit everything") => Review::Edit,
        _ => Review::Back,
    })
}

pub(crate) fn print_post(result: &GeneratedResult) {
    print_heading(&result.content.headline);
    println!("{}\n", result.content.caption);
    if !result.content.hashtags.is_empty() {
        println!("{}", style(result.content.hashtags.join(" ")).cyan());
    }
    println!(
        "\n  {} {}",
        style("Image:").bold(),
        describe_media(result.image_url.as_deref())
    );
    if result.is_custom_image {
        println!("  {}", style("(your upload)").dim());
    } else if !result.content.image_prompt_description.is_empty() {
        println!(
            "  {} {}",
            style("Prompt:").bold(),
            style(&result.content.image_prompt_description).dim()
        );
    }
}

async fn editor(ws: &mut Workspace) -> Result<bool> {
    let seed = ws.take_post_seed();
    let failed = matches!(ws.post.status().await, ToolStatus::Failed(_));
    let request = match seed {
        Some(seed) => seed,
        // Retry a failed submission with the same answers.
        None if failed => {
            ws.post.last_request().await.unwrap_or_default()
        }
        None => {
            if ws.post.current().await.is_some() {
                let options = vec!["New post", "Show the current post", "Back to menu"];
                match optional(Select::new("Create Post", options).prompt())? {
                    Some("New post") => {}
                    Some("Show the current post") => {
                        ws.select_panel(Panel::Result);
                        return Ok(true);
                    }
                    _ => return Ok(false),
                }
            }
            PostRequest::default()
        }
    };

    let Some(request) = run_wizard(request)? else {
        return Ok(false);
    };
    print_step("Generating text and image...");
    if let Err(e) = ws.generate_post(request).await {
        print_error(&e.to_string());
    }
    Ok(true)
}

/// Result panel actions. Returns `false` to leave the tool.
async fn result_panel(ws: &mut Workspace) -> Result<bool> {
    let Some(current) = ws.post.current().await else {
        ws.select_panel(Panel::Editor);
        return Ok(true);
    };
    print_post(&current);

    let mut options = vec!["Regenerate text"];
    if !current.is_custom_image && !current.content.image_prompt_description.is_empty() {
        options.push("Regenerate image");
    }
    options.extend(["Refine caption with AI", "Edit caption", "Back to editor", "Back to menu"]);

    let Some(choice) = optional(Select::new("Post actions:", options).prompt())? else {
        return Ok(false);
    };
    let outcome = match choice {
        "Regenerate text" => {
            print_step("Rewriting the text...");
            ws.regenerate_post_text().await.map(|_| ())
        }
        "Regenerate image" => {
            print_step("Generating a new image...");
            ws.regenerate_post_image().await.map(|_| ())
        }
        "Refine caption with AI" => {
            let Some(instruction) = ask_refinement()? else {
                return Ok(true);
            };
            print_step("Refining...");
            ws.post.refine_caption(&instruction).await.map(|_| ())
        }
        "Edit caption" => {
            if let Some(caption) = optional(
                Text::new("Caption:")
                    .with_initial_value(&current.content.caption)
                    .prompt(),
            )? {
                ws.post.edit_caption(caption.trim().to_string()).await;
                print_success("Caption saved.");
            }
            Ok(())
        }
        "Back to editor" => {
            ws.select_panel(Panel::Editor);
            Ok(())
        }
        _ => return Ok(false),
    };
    if let Err(e) = outcome {
        print_error(&e.to_string());
    }
    Ok(true)
}

pub async fn run(ws: &mut Workspace) -> Result<()> {
    loop {
        let keep_going = match ws.visible_panel().await {
            Panel::Editor => editor(ws).await?,
            Panel::Result => result_panel(ws).await?,
        };
        super::app::flush_notification(ws);
        if !keep_going {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seeded_requests_open_on_review() {
        let mut request = PostRequest::default();
        assert_eq!(starting_step(&request), 1);
        request.topic = "ACL rehab".into();
        request.origin = RequestOrigin::TrendSuggested;
        assert_eq!(starting_step(&request), 3);
        request.origin = RequestOrigin::ArticleDerived;
        assert_eq!(starting_step(&request), 3);
    }

    #[test]
    fn seeded_requests_without_a_topic_ask_for_one() {
        let request = PostRequest {
            topic: "   ".into(),
            origin: RequestOrigin::TrendSuggested,
            ..Default::default()
        };
        assert_eq!(starting_step(&request), 2);
    }

    #[test]
    fn back_from_a_seeded_review_walks_down_to_the_first_step() {
        assert_eq!(next_step(3, false), Some(2));
        assert_eq!(next_step(2, false), Some(1));
        assert_eq!(next_step(1, false), None);
        assert_eq!(next_step(2, true), Some(3));
    }

    #[test]
    fn refine_presets_map_to_instructions() {
        assert_eq!(preset_instruction("Shorten"), Some("Make it shorter"));
        assert_eq!(preset_instruction("Add emojis"), Some("Add emojis"));
        assert_eq!(preset_instruction(CUSTOM_REFINE), None);
        assert!(REFINE_PRESETS.iter().all(|(_, i)| !i.trim().is_empty()));
    }

    #[test]
    fn image_upload_becomes_a_data_url() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
        let url = image_data_url(file.path()).unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn non_images_are_rejected() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(image_data_url(file.path()).is_err());
    }
}
