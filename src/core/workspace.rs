use std::sync::Arc;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::bridge::{self, TrendSuggestion};
use crate::core::evidence::{EvidenceArticle, EvidenceSearch};
use crate::core::generation::types::{
    ArticleRequest, ConversionRequest, ConversionResult, GeneratedArticle, GeneratedResult,
    InfographicRequest, InfographicResult, PostRequest, RequestOrigin, ToolKind,
};
use crate::core::generation::{
    ArticleTool, ConversionTool, GenerationError, InfographicCoordinator, OneShotCoordinator,
    PendingMedia, PostCoordinator,
};
use crate::core::llm::GenerativeService;
use crate::core::memory::PersistenceStore;
use crate::core::rts::RtsHistory;
use crate::core::view::{Notifier, Panel, ViewMode, ViewState};

/// Application root: one coordinator per tool plus the navigation and
/// notification state shared between them.
pub struct Workspace {
    pub post: PostCoordinator,
    pub article: OneShotCoordinator<ArticleTool>,
    pub infographic: InfographicCoordinator,
    pub conversion: OneShotCoordinator<ConversionTool>,
    pub rts: RtsHistory,
    evidence: Arc<dyn EvidenceSearch>,
    view: ViewState,
    notifier: Notifier,
    post_seed: Option<PostRequest>,
    notification_seen: u64,
}

impl Workspace {
    /// Loads the persisted history and draft before anything else runs.
    pub async fn open(
        config: &AppConfig,
        service: Arc<dyn GenerativeService>,
        evidence: Arc<dyn EvidenceSearch>,
        store: PersistenceStore,
    ) -> Self {
        let session = store.load().await;
        info!(
            "Workspace ready ({} saved posts, merge guard {:?})",
            session.history.len(),
            config.generation.merge_guard
        );
        Self {
            post: PostCoordinator::new(Arc::clone(&service), store.clone(), session),
            article: OneShotCoordinator::new(ArticleTool, Arc::clone(&service)),
            infographic: InfographicCoordinator::new(
                Arc::clone(&service),
                config.generation.merge_guard,
            ),
            conversion: OneShotCoordinator::new(ConversionTool, service),
            rts: RtsHistory::new(store),
            evidence,
            view: ViewState::new(),
            notifier: Notifier::new(config.notifications.lifetime()),
            post_seed: None,
            notification_seen: 0,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The live notification, once per message.
    pub fn fresh_notification(&mut self) -> Option<String> {
        let (seq, message) = self.notifier.snapshot()?;
        if seq == self.notification_seen {
            return None;
        }
        self.notification_seen = seq;
        Some(message)
    }

    /// Entering a tool clears its stale error.
    pub async fn navigate(&mut self, mode: ViewMode) {
        self.view.navigate(mode);
        match self.view.active_tool() {
            Some(ToolKind::Post) => self.post.dismiss_error().await,
            Some(ToolKind::Article) => self.article.dismiss_error().await,
            Some(ToolKind::Infographic) => self.infographic.dismiss_error().await,
            Some(ToolKind::Conversion) => self.conversion.dismiss_error().await,
            None => {}
        }
    }

    pub fn select_panel(&mut self, panel: Panel) {
        self.view.select_panel(panel);
    }

    /// Pre-fills the post wizard and opens it. Nothing is submitted.
    pub async fn seed_post_wizard(&mut self, request: PostRequest) {
        if request.origin == RequestOrigin::ArticleDerived {
            self.notifier.show("Starting a post from the article...");
        }
        info!("Post wizard seeded ({:?})", request.origin);
        self.post_seed = Some(request);
        self.navigate(ViewMode::Post).await;
    }

    pub async fn article_to_post(&mut self, article: &GeneratedArticle) {
        self.seed_post_wizard(bridge::article_to_post_request(article))
            .await;
    }

    pub async fn use_trend(&mut self, trend: TrendSuggestion) {
        self.seed_post_wizard(bridge::trend_to_post_request(trend))
            .await;
    }

    pub fn take_post_seed(&mut self) -> Option<PostRequest> {
        self.post_seed.take()
    }

    fn settled(&mut self, message: &str) {
        self.view.on_generation_succeeded();
        self.notifier.show(message);
    }

    pub async fn generate_post(
        &mut self,
        request: PostRequest,
    ) -> Result<GeneratedResult, GenerationError> {
        let seed = (request.origin != RequestOrigin::Manual).then(|| request.clone());
        let result = match self.post.submit(request).await {
            Ok(result) => result,
            Err(e @ GenerationError::Validation(_)) => {
                // Nothing was recorded; hand the seed back to the wizard.
                if let Some(seed) = seed {
                    self.post_seed = Some(seed);
                }
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.settled("Post generated!");
        Ok(result)
    }

    pub async fn regenerate_post_text(&mut self) -> Result<Option<GeneratedResult>, GenerationError> {
        let updated = self.post.regenerate_text().await?;
        if updated.is_some() {
            self.notifier.show("Text updated!");
        }
        Ok(updated)
    }

    pub async fn regenerate_post_image(
        &mut self,
    ) -> Result<Option<GeneratedResult>, GenerationError> {
        let updated = self.post.regenerate_image().await?;
        if updated.is_some() {
            self.notifier.show("New image generated!");
        }
        Ok(updated)
    }

    /// Re-opens a saved post in the post tool's result panel.
    pub async fn open_history_entry(&mut self, id: &str) -> Option<GeneratedResult> {
        let entry = self.post.open_from_history(id).await?;
        self.navigate(ViewMode::Post).await;
        self.view.select_panel(Panel::Result);
        Some(entry)
    }

    pub async fn generate_article(
        &mut self,
        request: ArticleRequest,
    ) -> Result<GeneratedArticle, GenerationError> {
        let article = self.article.submit(request).await?;
        self.settled("SEO article created!");
        Ok(article)
    }

    /// Returns as soon as the structured payload is in; illustrations keep
    /// resolving in the background.
    pub async fn generate_infographic(
        &mut self,
        request: InfographicRequest,
    ) -> Result<(InfographicResult, PendingMedia), GenerationError> {
        let pending = self.infographic.submit(request).await?;
        self.settled("Infographic structured!");
        Ok(pending)
    }

    pub async fn generate_conversion(
        &mut self,
        request: ConversionRequest,
    ) -> Result<ConversionResult, GenerationError> {
        let result = self.conversion.submit(request).await?;
        self.settled("Conversion strategy ready!");
        Ok(result)
    }

    pub async fn search_evidence(&self, query: &str) -> Vec<EvidenceArticle> {
        let articles = self.evidence.search(query).await;
        if articles.is_empty() {
            warn!("No evidence found for '{}'", query.trim());
        }
        articles
    }

    pub async fn has_any_result(&self) -> bool {
        self.post.current().await.is_some()
            || self.article.current().await.is_some()
            || self.infographic.current().await.is_some()
            || self.conversion.current().await.is_some()
    }

    pub async fn is_any_in_flight(&self) -> bool {
        self.post.is_in_flight().await
            || self.article.is_in_flight().await
            || self.infographic.is_in_flight().await
            || self.conversion.is_in_flight().await
    }

    pub async fn visible_panel(&self) -> Panel {
        let has_result = self.has_any_result().await;
        let in_flight = self.is_any_in_flight().await;
        self.view.visible_panel(has_result, in_flight)
    }
}
