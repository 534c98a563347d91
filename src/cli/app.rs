use anyhow::Result;
use inquire::Select;

use super::{extras, optional, post, tools};
use crate::core::terminal::{print_notification, print_status};
use crate::core::view::ViewMode;
use crate::core::workspace::Workspace;

const QUIT: &str = "Quit";

const MENU: [ViewMode; 9] = [
    ViewMode::Post,
    ViewMode::Article,
    ViewMode::Infographic,
    ViewMode::Conversion,
    ViewMode::History,
    ViewMode::Trends,
    ViewMode::Evidence,
    ViewMode::Calculator,
    ViewMode::Compliance,
];

pub(crate) fn flush_notification(ws: &mut Workspace) {
    if let Some(message) = ws.fresh_notification() {
        print_notification(&message);
    }
}

async fn dashboard(ws: &Workspace) {
    let history = ws.post.history().await;
    print_status("Saved posts", &history.len().to_string());
    if let Some(latest) = history.first() {
        print_status("Latest", &latest.content.headline);
    }
}

pub async fn run(ws: &mut Workspace) -> Result<()> {
    dashboard(ws).await;
    loop {
        flush_notification(ws);
        ws.navigate(ViewMode::Dashboard).await;

        let mut options: Vec<&str> = MENU.iter().map(|m| m.title()).collect();
        options.push(QUIT);
        let Some(choice) = optional(
            Select::new("What would you like to do?", options)
                .with_page_size(MENU.len() + 1)
                .prompt(),
        )?
        else {
            return Ok(());
        };
        let Some(mode) = MENU.iter().copied().find(|m| m.title() == choice) else {
            return Ok(());
        };

        ws.navigate(mode).await;
        match mode {
            ViewMode::Post => post::run(ws).await?,
            ViewMode::Article => tools::article(ws).await?,
            ViewMode::Infographic => tools::infographic(ws).await?,
            ViewMode::Conversion => tools::conversion(ws).await?,
            ViewMode::History => extras::history(ws).await?,
            ViewMode::Trends => extras::trends(ws).await?,
            ViewMode::Evidence => extras::evidence(ws).await?,
            ViewMode::Calculator => extras::calculator(ws).await?,
            ViewMode::Compliance => extras::compliance(),
            ViewMode::Dashboard => {}
        }

        // A tool may hand over to the post wizard (article or trend bridge).
        if ws.view().mode() == ViewMode::Post && mode != ViewMode::Post {
            flush_notification(ws);
            post::run(ws).await?;
        }
    }
}
