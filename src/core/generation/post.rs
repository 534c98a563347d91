use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::status::{GenerationError, ToolScope, ToolStatus};
use super::types::{GeneratedResult, PostFormat, PostRequest, ToolKind};
use crate::core::llm::GenerativeService;
use crate::core::memory::{PersistenceStore, StoredSession};

pub const TEXT_REGEN_FAILED: &str = "Failed to regenerate the text";
pub const IMAGE_REGEN_FAILED: &str = "Failed to regenerate the image";
pub const REFINE_FAILED: &str = "Failed to refine the caption";
const SUBMIT_FAILED: &str = "An error occurred while generating the post.";

struct PostState {
    scope: ToolScope<GeneratedResult>,
    last_request: Option<PostRequest>,
    /// Newest first.
    history: Vec<GeneratedResult>,
    /// Text regeneration and caption refinement share this flag.
    regenerating_text: bool,
    regenerating_image: bool,
}

#[derive(Clone)]
pub struct PostCoordinator {
    state: Arc<Mutex<PostState>>,
    service: Arc<dyn GenerativeService>,
    store: PersistenceStore,
}

pub fn validate_post_request(request: &PostRequest) -> Result<(), GenerationError> {
    if request.topic.trim().is_empty() {
        return Err(GenerationError::Validation(
            "Enter a topic for the post.".to_string(),
        ));
    }
    Ok(())
}

impl PostCoordinator {
    /// Resumes from whatever the store loaded; the draft becomes the current
    /// result.
    pub fn new(
        service: Arc<dyn GenerativeService>,
        store: PersistenceStore,
        session: StoredSession,
    ) -> Self {
        let mut scope = ToolScope::new(ToolKind::Post);
        if let Some(draft) = session.draft {
            scope.replace_result(draft);
        }
        Self {
            state: Arc::new(Mutex::new(PostState {
                scope,
                last_request: None,
                history: session.history,
                regenerating_text: false,
                regenerating_image: false,
            })),
            service,
            store,
        }
    }

    async fn produce(&self, request: &PostRequest) -> Result<GeneratedResult> {
        let content = self.service.generate_post_text(request).await?;
        let result = match &request.uploaded_image {
            Some(image) => GeneratedResult::new(content, Some(image.clone()), true),
            None => {
                let image = self
                    .service
                    .generate_image(&content.image_prompt_description, request.format)
                    .await?;
                GeneratedResult::new(content, Some(image), false)
            }
        };
        Ok(result)
    }

    pub async fn submit(&self, request: PostRequest) -> Result<GeneratedResult, GenerationError> {
        validate_post_request(&request)?;
        let ticket = {
            let mut state = self.state.lock().await;
            let ticket = state.scope.begin()?;
            state.last_request = Some(request.clone());
            ticket
        };
        info!(
            "Generating post about '{}' ({:?})",
            request.topic.trim(),
            request.origin
        );

        let outcome = self.produce(&request).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(result) => {
                state.scope.succeed(ticket, result.clone());
                state.history.insert(0, result.clone());
                // Saved under the lock so concurrent writers persist in order.
                self.store.save_history(&state.history).await;
                self.store.save_draft(&result).await;
                info!("Post {} generated", result.id);
                Ok(result)
            }
            Err(e) => {
                let message = match e.to_string() {
                    m if m.trim().is_empty() => SUBMIT_FAILED.to_string(),
                    m => m,
                };
                warn!("Post generation failed: {}", message);
                state.scope.fail(ticket, message.clone());
                Err(GenerationError::Service {
                    tool: ToolKind::Post,
                    message,
                })
            }
        }
    }

    /// Rewrites the text of the current result from the remembered request.
    /// `Ok(None)` when there is nothing to regenerate, one is already running,
    /// or the user moved to another result before it finished.
    pub async fn regenerate_text(&self) -> Result<Option<GeneratedResult>, GenerationError> {
        let (request, result_id) = {
            let mut state = self.state.lock().await;
            if state.regenerating_text {
                return Ok(None);
            }
            let (Some(request), Some(current)) =
                (state.last_request.clone(), state.scope.result())
            else {
                debug!("Nothing to regenerate");
                return Ok(None);
            };
            let result_id = current.id.clone();
            state.regenerating_text = true;
            (request, result_id)
        };

        let outcome = self.service.generate_post_text(&request).await;

        let mut state = self.state.lock().await;
        state.regenerating_text = false;
        match outcome {
            Ok(content) => {
                let updated = match state.scope.result_mut() {
                    Some(current) if current.id == result_id => {
                        current.content = content;
                        Some(current.clone())
                    }
                    _ => None,
                };
                self.settle_update(&mut state, updated).await
            }
            Err(e) => {
                warn!("Text regeneration failed: {}", e);
                Err(Self::sub_failure(&mut state, TEXT_REGEN_FAILED))
            }
        }
    }

    /// Replaces only the media of the current result. User-supplied images are
    /// never overwritten.
    pub async fn regenerate_image(&self) -> Result<Option<GeneratedResult>, GenerationError> {
        let (prompt, format, result_id) = {
            let mut state = self.state.lock().await;
            if state.regenerating_image {
                return Ok(None);
            }
            let Some(current) = state.scope.result() else {
                return Ok(None);
            };
            if current.is_custom_image || current.content.image_prompt_description.trim().is_empty()
            {
                debug!("Image regeneration skipped for {}", current.id);
                return Ok(None);
            }
            let prompt = current.content.image_prompt_description.clone();
            let result_id = current.id.clone();
            let format = state
                .last_request
                .as_ref()
                .map(|r| r.format)
                .unwrap_or(PostFormat::Feed);
            state.regenerating_image = true;
            (prompt, format, result_id)
        };

        let outcome = self.service.generate_image(&prompt, format).await;

        let mut state = self.state.lock().await;
        state.regenerating_image = false;
        match outcome {
            Ok(image) => {
                let updated = match state.scope.result_mut() {
                    Some(current) if current.id == result_id => {
                        current.image_url = Some(image);
                        Some(current.clone())
                    }
                    _ => None,
                };
                self.settle_update(&mut state, updated).await
            }
            Err(e) => {
                warn!("Image regeneration failed: {}", e);
                Err(Self::sub_failure(&mut state, IMAGE_REGEN_FAILED))
            }
        }
    }

    pub async fn refine_caption(
        &self,
        instruction: &str,
    ) -> Result<Option<GeneratedResult>, GenerationError> {
        if instruction.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Describe how the caption should change.".to_string(),
            ));
        }
        let (caption, result_id) = {
            let mut state = self.state.lock().await;
            if state.regenerating_text {
                return Ok(None);
            }
            let Some(current) = state.scope.result() else {
                return Ok(None);
            };
            let pair = (current.content.caption.clone(), current.id.clone());
            state.regenerating_text = true;
            pair
        };

        let outcome = self.service.refine_text(&caption, instruction.trim()).await;

        let mut state = self.state.lock().await;
        state.regenerating_text = false;
        match outcome {
            Ok(refined) => {
                let updated = match state.scope.result_mut() {
                    Some(current) if current.id == result_id => {
                        current.content.caption = refined;
                        Some(current.clone())
                    }
                    _ => None,
                };
                self.settle_update(&mut state, updated).await
            }
            Err(e) => {
                warn!("Caption refinement failed: {}", e);
                Err(Self::sub_failure(&mut state, REFINE_FAILED))
            }
        }
    }

    pub async fn edit_caption(&self, caption: String) -> Option<GeneratedResult> {
        let mut state = self.state.lock().await;
        let current = state.scope.result_mut()?;
        current.content.caption = caption;
        let updated = current.clone();
        self.store.save_draft(&updated).await;
        Some(updated)
    }

    /// Shows a history entry as the current result. `None` while a submission
    /// is outstanding or when the id is unknown.
    pub async fn open_from_history(&self, id: &str) -> Option<GeneratedResult> {
        let mut state = self.state.lock().await;
        let entry = state.history.iter().find(|r| r.id == id).cloned()?;
        if !state.scope.replace_result(entry.clone()) {
            return None;
        }
        self.store.save_draft(&entry).await;
        Some(entry)
    }

    async fn settle_update(
        &self,
        state: &mut PostState,
        updated: Option<GeneratedResult>,
    ) -> Result<Option<GeneratedResult>, GenerationError> {
        match updated {
            Some(result) => {
                state.scope.mark_succeeded();
                self.store.save_draft(&result).await;
                Ok(Some(result))
            }
            None => {
                debug!("Current post changed while regenerating; update dropped");
                Ok(None)
            }
        }
    }

    fn sub_failure(state: &mut PostState, message: &str) -> GenerationError {
        state.scope.record_failure(message);
        GenerationError::Service {
            tool: ToolKind::Post,
            message: message.to_string(),
        }
    }

    pub async fn history(&self) -> Vec<GeneratedResult> {
        self.state.lock().await.history.clone()
    }

    pub async fn current(&self) -> Option<GeneratedResult> {
        self.state.lock().await.scope.result().cloned()
    }

    pub async fn status(&self) -> ToolStatus {
        self.state.lock().await.scope.status().clone()
    }

    pub async fn is_in_flight(&self) -> bool {
        self.state.lock().await.scope.is_in_flight()
    }

    pub async fn last_request(&self) -> Option<PostRequest> {
        self.state.lock().await.last_request.clone()
    }

    /// (text, image)
    pub async fn is_regenerating(&self) -> (bool, bool) {
        let state = self.state.lock().await;
        (state.regenerating_text, state.regenerating_image)
    }

    pub async fn dismiss_error(&self) {
        self.state.lock().await.scope.dismiss_error();
    }
}
