use console::{Emoji, style};

pub static SUCCESS_ICON: Emoji<'_, '_> = Emoji("✅ ", "");
pub static INFO_ICON: Emoji<'_, '_> = Emoji("ℹ️  ", "");
pub static WARN_ICON: Emoji<'_, '_> = Emoji("⚠️  ", "");
pub static ERROR_ICON: Emoji<'_, '_> = Emoji("❌ ", "");
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
pub static GLOBE: Emoji<'_, '_> = Emoji("🌐 ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("⚙️  ", "");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");
pub static BELL: Emoji<'_, '_> = Emoji("🔔 ", "");

pub fn print_success(msg: &str) {
    println!("{} {}", SUCCESS_ICON, style(msg).green());
}

pub fn print_info(msg: &str) {
    println!("{} {}", INFO_ICON, style(msg).blue());
}

pub fn print_warn(msg: &str) {
    println!("{} {}", WARN_ICON, style(msg).yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", ERROR_ICON, style(msg).red().bold());
}

pub fn print_status(label: &str, msg: &str) {
    println!("  {} {}: {}", GEAR, style(label).bold().cyan(), msg);
}

pub fn print_step(step: &str) {
    println!("{} {}", SPARKLE, style(step).bold());
}

pub fn print_notification(msg: &str) {
    println!("{} {}", BELL, style(msg).magenta().bold());
}

pub fn print_link(label: &str, url: &str) {
    println!(
        "  {} {}: {}",
        GLOBE,
        style(label).bold(),
        style(url).underlined().cyan()
    );
}

pub fn print_heading(title: &str) {
    println!("\n{}", style(title).bold().underlined());
}

/// Media references can be multi-megabyte data URLs; show only their shape.
pub fn describe_media(media: Option<&str>) -> String {
    match media {
        None => "pending".to_string(),
        Some(m) if m.starts_with("data:") => {
            let mime = m
                .trim_start_matches("data:")
                .split(';')
                .next()
                .unwrap_or("unknown");
            format!("{} data URL ({} KB)", mime, m.len() / 1024)
        }
        Some(m) => m.to_string(),
    }
}

/// A titled block of `name  description` lines for help screens.
pub struct GuideSection {
    title: String,
    rows: Vec<(String, String)>,
}

impl GuideSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows: Vec::new(),
        }
    }

    pub fn command(mut self, name: &str, description: &str) -> Self {
        self.rows.push((name.to_string(), description.to_string()));
        self
    }

    pub fn print(&self) {
        println!("\n {}", style(&self.title).bold().underlined());
        let width = self.rows.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        for (name, description) in &self.rows {
            println!(
                "   {:<width$}  {}",
                style(name).green(),
                style(description).dim(),
                width = width
            );
        }
    }
}

pub fn print_banner() {
    let lines: &[&str] = &[
        "                     _ _                     _       _ ",
        " _ __ ___   ___  __| (_)___  ___   ___ (_) __ _| |",
        "| '_ ` _ \\ / _ \\/ _` | / __|/ _ \\ / __|| |/ _` | |",
        "| | | | | |  __/ (_| | \\__ \\ (_) | (__ | | (_| | |",
        "|_| |_| |_|\\___|\\__,_|_|___/\\___/ \\___||_|\\__,_|_|",
    ];

    // Gradient: #0ea5e9 -> #14b8a6 -> #22c55e (diagonal top-left -> bottom-right)
    let stops: [(u8, u8, u8); 3] = [(14, 165, 233), (20, 184, 166), (34, 197, 94)];
    let max_w = lines.iter().map(|l| l.len()).max().unwrap_or(1) as u32;
    let max_d = max_w + lines.len() as u32 * 10;

    println!();
    for (y, line) in lines.iter().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            if ch == ' ' {
                print!(" ");
                continue;
            }
            let d = ((x as u32 + y as u32 * 10) * 1000 / max_d).min(1000);
            let (r, g, b) = if d <= 500 {
                lerp_color(stops[0], stops[1], d * 2)
            } else {
                lerp_color(stops[1], stops[2], (d - 500) * 2)
            };
            print!("\x1b[38;2;{};{};{}m{}", r, g, b, ch);
        }
        println!();
    }
    print!("\x1b[0m");

    println!("\x1b[38;2;34;197;94mContent studio for knee surgery practices.\x1b[0m\n");
}

fn lerp_color(a: (u8, u8, u8), b: (u8, u8, u8), t: u32) -> (u8, u8, u8) {
    let r = (a.0 as u32 * (1000 - t) + b.0 as u32 * t) / 1000;
    let g = (a.1 as u32 * (1000 - t) + b.1 as u32 * t) / 1000;
    let b_val = (a.2 as u32 * (1000 - t) + b.2 as u32 * t) / 1000;
    (r as u8, g as u8, b_val as u8)
}

pub fn print_goodbye() {
    println!(
        "\n{} {}",
        SPARKLE,
        style("Thank you for using medisocial. See you next time!")
            .bold()
            .cyan()
    );
}
