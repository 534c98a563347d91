use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::generation::types::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Dashboard,
    Post,
    Article,
    Infographic,
    Conversion,
    History,
    Trends,
    Evidence,
    Calculator,
    Compliance,
}

impl ViewMode {
    pub fn tool(self) -> Option<ToolKind> {
        match self {
            ViewMode::Post => Some(ToolKind::Post),
            ViewMode::Article => Some(ToolKind::Article),
            ViewMode::Infographic => Some(ToolKind::Infographic),
            ViewMode::Conversion => Some(ToolKind::Conversion),
            _ => None,
        }
    }

    /// Tools that are a single page and never show a result panel.
    pub fn is_full_page(self) -> bool {
        matches!(
            self,
            ViewMode::Trends | ViewMode::Evidence | ViewMode::Calculator | ViewMode::Compliance
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Dashboard => "Home",
            ViewMode::Post => "Create Post",
            ViewMode::Article => "Medical Blog",
            ViewMode::Infographic => "Infographic",
            ViewMode::Conversion => "Conversion",
            ViewMode::History => "History",
            ViewMode::Trends => "Trends",
            ViewMode::Evidence => "Evidence Finder",
            ViewMode::Calculator => "RTS Calculator",
            ViewMode::Compliance => "CFM Compliance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Editor,
    Result,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    mode: ViewMode,
    selected: Panel,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.mode.tool()
    }

    pub fn navigate(&mut self, mode: ViewMode) {
        self.mode = mode;
        self.selected = Panel::Editor;
    }

    /// Called once per successful settle; the user may toggle back afterwards.
    pub fn on_generation_succeeded(&mut self) {
        self.selected = Panel::Result;
    }

    pub fn select_panel(&mut self, panel: Panel) {
        self.selected = panel;
    }

    pub fn visible_panel(&self, has_any_result: bool, is_any_in_flight: bool) -> Panel {
        if self.mode.is_full_page() {
            return Panel::Editor;
        }
        if (has_any_result || is_any_in_flight) && self.selected == Panel::Result {
            Panel::Result
        } else {
            Panel::Editor
        }
    }
}

#[derive(Default)]
struct NotifierState {
    message: Option<String>,
    shown: u64,
    pending_clear: Option<JoinHandle<()>>,
}

/// Single ephemeral notification slot. A new message replaces the old one and
/// restarts the display lifetime.
#[derive(Clone)]
pub struct Notifier {
    state: Arc<Mutex<NotifierState>>,
    lifetime: Duration,
}

impl Notifier {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(NotifierState::default())),
            lifetime,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Must be called from within a tokio runtime.
    pub fn show(&self, message: impl Into<String>) {
        let message = message.into();
        debug!("Notification: {}", message);
        let mut state = self.lock();
        if let Some(pending) = state.pending_clear.take() {
            pending.abort();
        }
        state.shown += 1;
        state.message = Some(message);

        let shown = state.shown;
        let lifetime = self.lifetime;
        let slot = Arc::clone(&self.state);
        state.pending_clear = Some(tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            let mut state = slot.lock().unwrap_or_else(|e| e.into_inner());
            if state.shown == shown {
                state.message = None;
                state.pending_clear = None;
            }
        }));
    }

    pub fn current(&self) -> Option<String> {
        self.lock().message.clone()
    }

    /// The live message with its sequence number, so a renderer can tell a
    /// new message from one it already displayed.
    pub fn snapshot(&self) -> Option<(u64, String)> {
        let state = self.lock();
        state.message.clone().map(|m| (state.shown, m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_defaults_to_editor_and_switches_after_success() {
        let mut view = ViewState::new();
        view.navigate(ViewMode::Post);
        assert_eq!(view.visible_panel(true, false), Panel::Editor);

        view.on_generation_succeeded();
        assert_eq!(view.visible_panel(true, false), Panel::Result);

        view.select_panel(Panel::Editor);
        assert_eq!(view.visible_panel(true, false), Panel::Editor);
    }

    #[test]
    fn result_panel_needs_something_to_show() {
        let mut view = ViewState::new();
        view.navigate(ViewMode::Article);
        view.select_panel(Panel::Result);
        assert_eq!(view.visible_panel(false, false), Panel::Editor);
        assert_eq!(view.visible_panel(false, true), Panel::Result);
    }

    #[test]
    fn navigation_resets_to_editor() {
        let mut view = ViewState::new();
        view.navigate(ViewMode::Infographic);
        view.on_generation_succeeded();
        view.navigate(ViewMode::Conversion);
        assert_eq!(view.visible_panel(true, true), Panel::Editor);
        assert_eq!(view.active_tool(), Some(ToolKind::Conversion));
    }

    #[test]
    fn full_page_tools_never_show_results() {
        let mut view = ViewState::new();
        view.navigate(ViewMode::Calculator);
        view.select_panel(Panel::Result);
        assert_eq!(view.visible_panel(true, true), Panel::Editor);
        assert_eq!(view.active_tool(), None);
    }

    #[test]
    fn compliance_guide_is_a_static_page() {
        assert!(ViewMode::Compliance.is_full_page());
        assert_eq!(ViewMode::Compliance.tool(), None);
        assert_eq!(ViewMode::Compliance.title(), "CFM Compliance");
    }

    #[tokio::test(start_paused = true)]
    async fn notification_clears_after_lifetime() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.show("Post generated!");
        assert_eq!(notifier.current().as_deref(), Some("Post generated!"));
        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(notifier.current().is_some());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifier.current(), None);
    }

    #[tokio::test]
    async fn snapshot_distinguishes_repeated_messages() {
        let notifier = Notifier::new(Duration::from_secs(3));
        assert_eq!(notifier.snapshot(), None);
        notifier.show("Saved");
        let (first, _) = notifier.snapshot().unwrap();
        notifier.show("Saved");
        let (second, message) = notifier.snapshot().unwrap();
        assert!(second > first);
        assert_eq!(message, "Saved");
    }

    #[tokio::test(start_paused = true)]
    async fn new_notification_preempts_pending_clear() {
        let notifier = Notifier::new(Duration::from_secs(3));
        notifier.show("first");
        tokio::time::sleep(Duration::from_secs(2)).await;
        notifier.show("second");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(notifier.current().as_deref(), Some("second"));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(notifier.current(), None);
    }
}
