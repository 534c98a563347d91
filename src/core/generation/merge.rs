//! Merging of independently resolving media into the stored result of a
//! two-phase tool.

use serde::Deserialize;
use tracing::debug;

use super::status::{Ticket, ToolScope};
use super::types::InfographicResult;

/// How a late media completion decides whether it may still write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeGuard {
    /// Write whenever some result is stored, whichever request produced it.
    ResultPresent,
    /// Write only into the result of the request that spawned the media call.
    #[default]
    MatchingRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    DroppedNoResult,
    DroppedStale,
    /// The media call itself failed; the slot stays unset.
    Failed,
}

/// A result whose media fields are filled in after the structured payload.
pub trait PartialResult {
    type Slot: Copy + std::fmt::Debug + Send + 'static;

    /// Every illustration the payload asks for, one per distinct slot.
    fn media_prompts(&self) -> Vec<(Self::Slot, String)>;

    fn set_media(&mut self, slot: Self::Slot, media: String);

    fn media(&self, slot: Self::Slot) -> Option<&str>;
}

pub fn merge_media<T: PartialResult>(
    scope: &mut ToolScope<T>,
    ticket: Ticket,
    slot: T::Slot,
    media: String,
    guard: MergeGuard,
) -> MergeOutcome {
    if guard == MergeGuard::MatchingRequest && ticket.request_id != scope.request_id() {
        debug!(
            "Dropping {:?} media from request {} (current request {})",
            slot,
            ticket.request_id,
            scope.request_id()
        );
        return MergeOutcome::DroppedStale;
    }
    match scope.result_mut() {
        Some(result) => {
            result.set_media(slot, media);
            MergeOutcome::Applied
        }
        None => {
            debug!("Dropping {:?} media: no result stored", slot);
            MergeOutcome::DroppedNoResult
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfographicSlot {
    Hero,
    Anatomy,
}

fn non_empty(prompt: Option<&String>) -> Option<String> {
    prompt
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

impl PartialResult for InfographicResult {
    type Slot = InfographicSlot;

    fn media_prompts(&self) -> Vec<(InfographicSlot, String)> {
        let mut prompts = Vec::new();
        if let Some(hero) = non_empty(self.data.hero_image_prompt.as_ref()) {
            prompts.push((InfographicSlot::Hero, hero));
        }
        if let Some(anatomy) = non_empty(
            self.data
                .anatomy
                .as_ref()
                .and_then(|a| a.image_prompt.as_ref()),
        ) {
            prompts.push((InfographicSlot::Anatomy, anatomy));
        }
        prompts
    }

    fn set_media(&mut self, slot: InfographicSlot, media: String) {
        match slot {
            InfographicSlot::Hero => self.hero_image_url = Some(media),
            InfographicSlot::Anatomy => self.anatomy_image_url = Some(media),
        }
    }

    fn media(&self, slot: InfographicSlot) -> Option<&str> {
        match slot {
            InfographicSlot::Hero => self.hero_image_url.as_deref(),
            InfographicSlot::Anatomy => self.anatomy_image_url.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::types::{AnatomyPanel, InfographicData, ToolKind};

    fn payload() -> InfographicResult {
        InfographicResult::from_payload(InfographicData {
            title: "ACL".into(),
            hero_image_prompt: Some("athlete".into()),
            anatomy: Some(AnatomyPanel {
                title: "Knee".into(),
                image_prompt: Some("  ".into()),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    #[test]
    fn blank_prompts_are_not_requested() {
        let prompts = payload().media_prompts();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].0, InfographicSlot::Hero);
    }

    #[test]
    fn merge_touches_only_the_named_slot() {
        let mut scope = ToolScope::new(ToolKind::Infographic);
        let ticket = scope.begin().unwrap();
        let mut base = payload();
        base.anatomy_image_url = Some("kept".into());
        scope.succeed(ticket, base);

        let outcome = merge_media(
            &mut scope,
            ticket,
            InfographicSlot::Hero,
            "hero.png".into(),
            MergeGuard::MatchingRequest,
        );
        assert_eq!(outcome, MergeOutcome::Applied);
        let result = scope.result().unwrap();
        assert_eq!(result.media(InfographicSlot::Hero), Some("hero.png"));
        assert_eq!(result.media(InfographicSlot::Anatomy), Some("kept"));
        assert_eq!(result.data.title, "ACL");
    }

    #[test]
    fn merge_into_cleared_result_is_dropped() {
        let mut scope = ToolScope::new(ToolKind::Infographic);
        let ticket = scope.begin().unwrap();
        scope.succeed(ticket, payload());
        scope.clear();
        let outcome = merge_media(
            &mut scope,
            ticket,
            InfographicSlot::Hero,
            "late.png".into(),
            MergeGuard::ResultPresent,
        );
        assert_eq!(outcome, MergeOutcome::DroppedNoResult);
    }

    #[test]
    fn stale_merge_depends_on_guard() {
        let mut scope = ToolScope::new(ToolKind::Infographic);
        let old = scope.begin().unwrap();
        scope.succeed(old, payload());
        let new = scope.begin().unwrap();
        scope.succeed(new, payload());

        let strict = merge_media(
            &mut scope,
            old,
            InfographicSlot::Hero,
            "old.png".into(),
            MergeGuard::MatchingRequest,
        );
        assert_eq!(strict, MergeOutcome::DroppedStale);
        assert!(scope.result().unwrap().hero_image_url.is_none());

        let lenient = merge_media(
            &mut scope,
            old,
            InfographicSlot::Hero,
            "old.png".into(),
            MergeGuard::ResultPresent,
        );
        assert_eq!(lenient, MergeOutcome::Applied);
        assert_eq!(
            scope.result().unwrap().hero_image_url.as_deref(),
            Some("old.png")
        );
    }
}
