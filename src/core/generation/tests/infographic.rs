use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::fake::{FakeService, eventually};
use crate::core::generation::types::{InfographicRequest, PostFormat};
use crate::core::generation::{
    GenerationError, InfographicCoordinator, InfographicSlot, MergeGuard, MergeOutcome,
    ToolStatus,
};

fn request(topic: &str) -> InfographicRequest {
    InfographicRequest {
        topic: topic.into(),
        ..Default::default()
    }
}

fn setup(guard: MergeGuard) -> (Arc<FakeService>, InfographicCoordinator) {
    let service = Arc::new(FakeService::new());
    (service.clone(), InfographicCoordinator::new(service, guard))
}

async fn merge_in_order(first: InfographicSlot) {
    let (service, infographic) = setup(MergeGuard::MatchingRequest);
    let hero = service.gate_image("hero knee");
    let anatomy = service.gate_image("anatomy knee");

    let (base, pending) = infographic.submit(request("knee")).await.unwrap();
    assert!(base.hero_image_url.is_none() && base.anatomy_image_url.is_none());
    assert_eq!(pending.len(), 2);
    assert_eq!(infographic.status().await, ToolStatus::Succeeded);

    let (first_gate, second_gate) = match first {
        InfographicSlot::Hero => (hero, anatomy),
        InfographicSlot::Anatomy => (anatomy, hero),
    };
    first_gate.send(()).unwrap();
    eventually(|| {
        let infographic = infographic.clone();
        async move {
            let current = infographic.current().await.unwrap();
            match first {
                InfographicSlot::Hero => current.hero_image_url.is_some(),
                InfographicSlot::Anatomy => current.anatomy_image_url.is_some(),
            }
        }
    })
    .await;
    let partial = infographic.current().await.unwrap();
    assert_eq!(
        partial.hero_image_url.is_some(),
        first == InfographicSlot::Hero
    );
    assert_eq!(
        partial.anatomy_image_url.is_some(),
        first == InfographicSlot::Anatomy
    );

    second_gate.send(()).unwrap();
    let outcomes = pending.settled().await;
    assert!(outcomes.iter().all(|(_, o)| *o == MergeOutcome::Applied));

    let done = infographic.current().await.unwrap();
    assert!(done.hero_image_url.unwrap().starts_with("img:hero knee"));
    assert!(done.anatomy_image_url.unwrap().starts_with("img:anatomy knee"));
    assert_eq!(done.data, base.data);
}

#[tokio::test]
async fn hero_then_anatomy_fills_both_slots() {
    merge_in_order(InfographicSlot::Hero).await;
}

#[tokio::test]
async fn anatomy_then_hero_fills_both_slots() {
    merge_in_order(InfographicSlot::Anatomy).await;
}

/// Resubmits while the first submission's illustrations are still pending.
async fn overtaken_submission(guard: MergeGuard) -> (InfographicCoordinator, Vec<MergeOutcome>) {
    let (service, infographic) = setup(guard);
    let hero = service.gate_image("hero old");
    let anatomy = service.gate_image("anatomy old");

    let (_, old_pending) = infographic.submit(request("old")).await.unwrap();
    let (_, new_pending) = infographic.submit(request("new")).await.unwrap();
    new_pending.settled().await;

    hero.send(()).unwrap();
    anatomy.send(()).unwrap();
    let outcomes = old_pending
        .settled()
        .await
        .into_iter()
        .map(|(_, o)| o)
        .collect();
    (infographic, outcomes)
}

#[tokio::test]
async fn stale_media_is_dropped_under_matching_request_guard() {
    let (infographic, outcomes) = overtaken_submission(MergeGuard::MatchingRequest).await;
    assert_eq!(
        outcomes,
        vec![MergeOutcome::DroppedStale, MergeOutcome::DroppedStale]
    );
    let current = infographic.current().await.unwrap();
    assert_eq!(current.data.title, "new");
    assert!(current.hero_image_url.unwrap().starts_with("img:hero new"));
    assert!(current.anatomy_image_url.unwrap().starts_with("img:anatomy new"));
}

#[tokio::test]
async fn stale_media_lands_under_result_present_guard() {
    let (infographic, outcomes) = overtaken_submission(MergeGuard::ResultPresent).await;
    assert_eq!(outcomes, vec![MergeOutcome::Applied, MergeOutcome::Applied]);
    let current = infographic.current().await.unwrap();
    assert_eq!(current.data.title, "new");
    assert!(current.hero_image_url.unwrap().starts_with("img:hero old"));
}

#[tokio::test]
async fn media_after_clear_is_dropped() {
    let (service, infographic) = setup(MergeGuard::ResultPresent);
    let hero = service.gate_image("hero knee");
    let anatomy = service.gate_image("anatomy knee");
    let (_, pending) = infographic.submit(request("knee")).await.unwrap();

    infographic.clear().await;
    assert_eq!(infographic.status().await, ToolStatus::Idle);
    hero.send(()).unwrap();
    anatomy.send(()).unwrap();

    let outcomes = pending.settled().await;
    assert!(
        outcomes
            .iter()
            .all(|(_, o)| *o == MergeOutcome::DroppedNoResult)
    );
    assert!(infographic.current().await.is_none());
}

#[tokio::test]
async fn failed_illustrations_leave_slots_unset() {
    let (service, infographic) = setup(MergeGuard::MatchingRequest);
    service.fail_image.store(true, Ordering::SeqCst);
    let (_, pending) = infographic.submit(request("knee")).await.unwrap();
    let outcomes = pending.settled().await;
    assert!(outcomes.iter().all(|(_, o)| *o == MergeOutcome::Failed));

    let current = infographic.current().await.unwrap();
    assert!(current.hero_image_url.is_none() && current.anatomy_image_url.is_none());
    assert_eq!(infographic.status().await, ToolStatus::Succeeded);
}

#[tokio::test]
async fn illustrations_use_feed_format() {
    let (service, infographic) = setup(MergeGuard::MatchingRequest);
    let (_, pending) = infographic.submit(request("knee")).await.unwrap();
    pending.settled().await;
    assert_eq!(
        *service.image_formats.lock().unwrap(),
        vec![PostFormat::Feed, PostFormat::Feed]
    );
}

#[tokio::test]
async fn payload_failure_and_busy_and_validation() {
    let (service, infographic) = setup(MergeGuard::MatchingRequest);
    assert!(matches!(
        infographic.submit(request("")).await,
        Err(GenerationError::Validation(_))
    ));

    let release = service.gate_infographic();
    let first = tokio::spawn({
        let infographic = infographic.clone();
        async move { infographic.submit(request("knee")).await.map(|(r, _)| r) }
    });
    eventually(|| {
        let infographic = infographic.clone();
        async move { infographic.is_in_flight().await }
    })
    .await;
    assert!(matches!(
        infographic.submit(request("hip")).await,
        Err(GenerationError::Busy(_))
    ));
    release.send(()).unwrap();
    assert!(first.await.unwrap().is_ok());
    assert_eq!(service.infographic_calls.load(Ordering::SeqCst), 1);

    service.fail_text.store(true, Ordering::SeqCst);
    let err = infographic.submit(request("hip")).await.unwrap_err();
    assert_eq!(err.to_string(), "infographic model unavailable");
    assert!(matches!(infographic.status().await, ToolStatus::Failed(_)));
    assert_eq!(infographic.current().await.unwrap().data.title, "knee");
}
