use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::fake::{FakeService, eventually};
use crate::core::generation::post::{IMAGE_REGEN_FAILED, PostCoordinator, TEXT_REGEN_FAILED};
use crate::core::generation::types::{PostFormat, PostRequest};
use crate::core::generation::{GenerationError, ToolStatus};
use crate::core::memory::{InMemoryKeyValueStore, PersistenceStore, StoredSession};

fn request(topic: &str) -> PostRequest {
    PostRequest {
        topic: topic.into(),
        ..Default::default()
    }
}

fn setup() -> (Arc<FakeService>, PersistenceStore, PostCoordinator) {
    let service = Arc::new(FakeService::new());
    let store = PersistenceStore::new(Arc::new(InMemoryKeyValueStore::new()));
    let coordinator = PostCoordinator::new(service.clone(), store.clone(), StoredSession::default());
    (service, store, coordinator)
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let (service, _, post) = setup();
    let release = service.gate_text();

    let first = tokio::spawn({
        let post = post.clone();
        async move { post.submit(request("meniscus")).await }
    });
    eventually(|| {
        let post = post.clone();
        async move { post.is_in_flight().await }
    })
    .await;

    let second = post.submit(request("acl")).await;
    assert!(matches!(second, Err(GenerationError::Busy(_))));
    assert_eq!(service.texts(), 1);
    assert_eq!(post.status().await, ToolStatus::InFlight);

    release.send(()).unwrap();
    let result = first.await.unwrap().unwrap();
    assert!(result.content.headline.starts_with("meniscus"));
    assert_eq!(post.history().await.len(), 1);
    assert_eq!(post.status().await, ToolStatus::Succeeded);
}

#[tokio::test]
async fn history_grows_newest_first_and_is_persisted() {
    let (_, store, post) = setup();
    let mut ids = Vec::new();
    for topic in ["a", "b", "c"] {
        ids.push(post.submit(request(topic)).await.unwrap().id);
    }

    let history = post.history().await;
    assert_eq!(history.len(), 3);
    let order: Vec<_> = history.iter().map(|r| r.id.clone()).collect();
    ids.reverse();
    assert_eq!(order, ids);

    let stored = store.load().await;
    assert_eq!(stored.history, history);
    assert_eq!(stored.draft.as_ref(), history.first());
}

#[tokio::test]
async fn empty_topic_is_a_validation_error_without_a_call() {
    let (service, _, post) = setup();
    let err = post.submit(request("   ")).await.unwrap_err();
    assert!(matches!(err, GenerationError::Validation(_)));
    assert_eq!(service.texts(), 0);
    assert_eq!(post.status().await, ToolStatus::Idle);
}

#[tokio::test]
async fn failed_submit_keeps_the_previous_result() {
    let (service, _, post) = setup();
    let first = post.submit(request("first")).await.unwrap();

    service.fail_text.store(true, Ordering::SeqCst);
    let err = post.submit(request("second")).await.unwrap_err();
    assert_eq!(err.to_string(), "quota exceeded");
    assert_eq!(post.status().await, ToolStatus::Failed("quota exceeded".into()));
    assert_eq!(post.current().await, Some(first));
    assert_eq!(post.history().await.len(), 1);

    service.fail_text.store(false, Ordering::SeqCst);
    assert!(post.submit(request("third")).await.is_ok());
}

#[tokio::test]
async fn text_regeneration_without_a_previous_request_is_a_no_op() {
    let (service, store, fresh) = setup();
    assert_eq!(fresh.regenerate_text().await, Ok(None));
    assert_eq!(service.texts(), 0);

    // A resumed draft has a result but no remembered request.
    let seeded = PostCoordinator::new(service.clone(), store.clone(), StoredSession::default());
    seeded.submit(request("draft")).await.unwrap();
    let resumed = PostCoordinator::new(service.clone(), store.clone(), store.load().await);
    assert!(resumed.current().await.is_some());
    let calls = service.texts();
    assert_eq!(resumed.regenerate_text().await, Ok(None));
    assert_eq!(service.texts(), calls);
}

#[tokio::test]
async fn text_regeneration_replaces_content_and_keeps_media() {
    let (service, store, post) = setup();
    let original = post.submit(request("rehab")).await.unwrap();

    let updated = post.regenerate_text().await.unwrap().unwrap();
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.image_url, original.image_url);
    assert_ne!(updated.content.headline, original.content.headline);
    assert_eq!(service.images(), 1);
    assert_eq!(store.load().await.draft, Some(updated));
}

#[tokio::test]
async fn text_regeneration_failure_is_reported_and_result_kept() {
    let (service, _, post) = setup();
    let original = post.submit(request("rehab")).await.unwrap();
    service.fail_text.store(true, Ordering::SeqCst);

    let err = post.regenerate_text().await.unwrap_err();
    assert_eq!(err.to_string(), TEXT_REGEN_FAILED);
    assert_eq!(post.status().await, ToolStatus::Failed(TEXT_REGEN_FAILED.into()));
    assert_eq!(post.current().await, Some(original));
    assert_eq!(post.is_regenerating().await, (false, false));
}

#[tokio::test]
async fn text_regeneration_is_dropped_when_another_result_was_opened() {
    let (service, _, post) = setup();
    let older = post.submit(request("older")).await.unwrap();
    post.submit(request("newer")).await.unwrap();

    let release = service.gate_text();
    let regen = tokio::spawn({
        let post = post.clone();
        async move { post.regenerate_text().await }
    });
    eventually(|| {
        let post = post.clone();
        async move { post.is_regenerating().await.0 }
    })
    .await;

    assert_eq!(post.regenerate_text().await, Ok(None));
    assert_eq!(post.open_from_history(&older.id).await, Some(older.clone()));
    release.send(()).unwrap();

    assert_eq!(regen.await.unwrap(), Ok(None));
    assert_eq!(post.current().await, Some(older));
}

#[tokio::test]
async fn custom_image_is_never_regenerated() {
    let (service, _, post) = setup();
    let upload = "data:image/png;base64,AAAA".to_string();
    let result = post
        .submit(PostRequest {
            uploaded_image: Some(upload.clone()),
            ..request("clinic photo")
        })
        .await
        .unwrap();
    assert!(result.is_custom_image);
    assert_eq!(result.image_url, Some(upload.clone()));
    assert_eq!(service.images(), 0);

    assert_eq!(post.regenerate_image().await, Ok(None));
    assert_eq!(service.images(), 0);
    assert_eq!(post.current().await.unwrap().image_url, Some(upload));
}

#[tokio::test]
async fn image_regeneration_needs_a_prompt() {
    let (service, _, post) = setup();
    post.submit(request("noimage topic")).await.unwrap();
    let calls = service.images();
    assert_eq!(post.regenerate_image().await, Ok(None));
    assert_eq!(service.images(), calls);
}

#[tokio::test]
async fn image_regeneration_uses_the_remembered_format() {
    let (service, _, post) = setup();
    let original = post
        .submit(PostRequest {
            format: PostFormat::Story,
            ..request("sprint")
        })
        .await
        .unwrap();

    let updated = post.regenerate_image().await.unwrap().unwrap();
    assert_eq!(updated.content, original.content);
    assert_ne!(updated.image_url, original.image_url);
    assert_eq!(
        *service.image_formats.lock().unwrap(),
        vec![PostFormat::Story, PostFormat::Story]
    );
}

#[tokio::test]
async fn resumed_draft_regenerates_image_in_feed_format() {
    let (service, store, post) = setup();
    post.submit(PostRequest {
        format: PostFormat::Story,
        ..request("story")
    })
    .await
    .unwrap();

    let resumed = PostCoordinator::new(service.clone(), store.clone(), store.load().await);
    resumed.regenerate_image().await.unwrap().unwrap();
    assert_eq!(
        service.image_formats.lock().unwrap().last(),
        Some(&PostFormat::Feed)
    );
}

#[tokio::test]
async fn image_regeneration_failure_is_reported() {
    let (service, _, post) = setup();
    post.submit(request("knee")).await.unwrap();
    service.fail_image.store(true, Ordering::SeqCst);
    let err = post.regenerate_image().await.unwrap_err();
    assert_eq!(err.to_string(), IMAGE_REGEN_FAILED);
    assert!(post.current().await.unwrap().image_url.is_some());
}

#[tokio::test]
async fn caption_edits_and_refinements_are_saved_as_draft() {
    let (_, store, post) = setup();
    post.submit(request("knee")).await.unwrap();

    let edited = post.edit_caption("Hand written".into()).await.unwrap();
    assert_eq!(edited.content.caption, "Hand written");
    assert_eq!(store.load().await.draft, Some(edited));

    let refined = post.refine_caption("shorter").await.unwrap().unwrap();
    assert_eq!(refined.content.caption, "Hand written (shorter)");
    assert_eq!(store.load().await.draft, Some(refined));

    assert!(matches!(
        post.refine_caption(" ").await,
        Err(GenerationError::Validation(_))
    ));
}

#[tokio::test]
async fn opening_history_entry_sets_the_draft() {
    let (_, store, post) = setup();
    let first = post.submit(request("first")).await.unwrap();
    post.submit(request("second")).await.unwrap();

    assert_eq!(post.open_from_history(&first.id).await, Some(first.clone()));
    assert_eq!(post.current().await, Some(first.clone()));
    assert_eq!(store.load().await.draft, Some(first));
    assert_eq!(post.open_from_history("missing").await, None);
}

#[tokio::test]
async fn text_and_image_regeneration_run_side_by_side() {
    let (service, _, post) = setup();
    post.submit(request("knee")).await.unwrap();

    let release = service.gate_text();
    let text = tokio::spawn({
        let post = post.clone();
        async move { post.regenerate_text().await }
    });
    eventually(|| {
        let post = post.clone();
        async move { post.is_regenerating().await.0 }
    })
    .await;

    let image = post.regenerate_image().await.unwrap().unwrap();
    assert_eq!(image.image_url.as_deref(), Some("img:photo of knee:2"));
    assert_eq!(post.is_regenerating().await, (true, false));

    release.send(()).unwrap();
    let rewritten = text.await.unwrap().unwrap().unwrap();
    assert_eq!(rewritten.content.headline, "knee #2");
    assert_eq!(rewritten.image_url.as_deref(), Some("img:photo of knee:2"));
    assert_eq!(post.is_regenerating().await, (false, false));
    assert_eq!(post.current().await, Some(rewritten));
}

#[tokio::test]
async fn regeneration_outlived_by_a_new_submission_is_dropped() {
    let (service, _, post) = setup();
    post.submit(request("older")).await.unwrap();

    let release = service.gate_text();
    let regen = tokio::spawn({
        let post = post.clone();
        async move { post.regenerate_text().await }
    });
    eventually(|| {
        let post = post.clone();
        async move { post.is_regenerating().await.0 }
    })
    .await;

    let newer = post.submit(request("newer")).await.unwrap();
    assert_eq!(newer.content.headline, "newer #3");

    release.send(()).unwrap();
    assert_eq!(regen.await.unwrap(), Ok(None));
    assert_eq!(post.current().await, Some(newer));
    assert_eq!(post.status().await, ToolStatus::Succeeded);
    assert_eq!(post.history().await.len(), 2);
}

#[tokio::test]
async fn image_regeneration_runs_while_a_submission_is_in_flight() {
    let (service, _, post) = setup();
    post.submit(request("older")).await.unwrap();

    let release = service.gate_text();
    let pending = tokio::spawn({
        let post = post.clone();
        async move { post.submit(request("newer")).await }
    });
    eventually(|| {
        let post = post.clone();
        async move { post.is_in_flight().await }
    })
    .await;

    let updated = post.regenerate_image().await.unwrap().unwrap();
    assert_eq!(updated.content.headline, "older #1");
    assert_eq!(updated.image_url.as_deref(), Some("img:photo of older:2"));
    assert_eq!(post.status().await, ToolStatus::InFlight);

    release.send(()).unwrap();
    let newer = pending.await.unwrap().unwrap();
    assert_eq!(newer.content.headline, "newer #2");
    assert_eq!(post.current().await, Some(newer));
    assert_eq!(post.status().await, ToolStatus::Succeeded);
}
