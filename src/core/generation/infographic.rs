use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::merge::{InfographicSlot, MergeGuard, MergeOutcome, PartialResult, merge_media};
use super::status::{GenerationError, ToolScope, ToolStatus};
use super::types::{InfographicRequest, InfographicResult, PostFormat, ToolKind};
use crate::core::llm::GenerativeService;

/// Media calls spawned by one submission. Dropping it does not cancel them.
#[derive(Debug)]
pub struct PendingMedia {
    tasks: Vec<(InfographicSlot, JoinHandle<MergeOutcome>)>,
}

impl PendingMedia {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits for every media call, in spawn order.
    pub async fn settled(self) -> Vec<(InfographicSlot, MergeOutcome)> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for (slot, task) in self.tasks {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("{:?} media task did not complete: {}", slot, e);
                    MergeOutcome::Failed
                }
            };
            outcomes.push((slot, outcome));
        }
        outcomes
    }
}

#[derive(Clone)]
pub struct InfographicCoordinator {
    scope: Arc<Mutex<ToolScope<InfographicResult>>>,
    service: Arc<dyn GenerativeService>,
    guard: MergeGuard,
}

impl InfographicCoordinator {
    pub fn new(service: Arc<dyn GenerativeService>, guard: MergeGuard) -> Self {
        Self {
            scope: Arc::new(Mutex::new(ToolScope::new(ToolKind::Infographic))),
            service,
            guard,
        }
    }

    /// Settles as soon as the structured payload arrives. The illustrations it
    /// asks for are generated concurrently and merged as each one resolves.
    pub async fn submit(
        &self,
        request: InfographicRequest,
    ) -> Result<(InfographicResult, PendingMedia), GenerationError> {
        if request.topic.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Enter a topic for the infographic.".to_string(),
            ));
        }
        let ticket = self.scope.lock().await.begin()?;
        info!(
            "Generating infographic about '{}' (request {})",
            request.topic.trim(),
            ticket.request_id
        );

        let outcome = self.service.generate_infographic(&request).await;

        let base = {
            let mut scope = self.scope.lock().await;
            match outcome {
                Ok(data) => {
                    let base = InfographicResult::from_payload(data);
                    scope.succeed(ticket, base.clone());
                    base
                }
                Err(e) => {
                    warn!("Infographic generation failed: {}", e);
                    let err = GenerationError::service(ToolKind::Infographic, &e);
                    scope.fail(ticket, err.to_string());
                    return Err(err);
                }
            }
        };

        let tasks = base
            .media_prompts()
            .into_iter()
            .map(|(slot, prompt)| {
                let scope = Arc::clone(&self.scope);
                let service = Arc::clone(&self.service);
                let guard = self.guard;
                let task = tokio::spawn(async move {
                    match service.generate_image(&prompt, PostFormat::Feed).await {
                        Ok(media) => {
                            let mut scope = scope.lock().await;
                            merge_media(&mut *scope, ticket, slot, media, guard)
                        }
                        Err(e) => {
                            warn!("{:?} illustration failed: {}", slot, e);
                            MergeOutcome::Failed
                        }
                    }
                });
                (slot, task)
            })
            .collect();

        Ok((base, PendingMedia { tasks }))
    }

    pub async fn current(&self) -> Option<InfographicResult> {
        self.scope.lock().await.result().cloned()
    }

    pub async fn status(&self) -> ToolStatus {
        self.scope.lock().await.status().clone()
    }

    pub async fn is_in_flight(&self) -> bool {
        self.scope.lock().await.is_in_flight()
    }

    pub async fn dismiss_error(&self) {
        self.scope.lock().await.dismiss_error();
    }

    pub async fn clear(&self) {
        self.scope.lock().await.clear();
    }
}
