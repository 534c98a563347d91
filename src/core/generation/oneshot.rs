use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::status::{GenerationError, ToolScope, ToolStatus};
use super::types::{
    ArticleRequest, ConversionRequest, ConversionResult, GeneratedArticle, ToolKind,
};
use crate::core::llm::GenerativeService;

/// A tool that settles with a single service call.
#[async_trait]
pub trait OneShotTool: Send + Sync + 'static {
    type Request: Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    fn kind(&self) -> ToolKind;

    fn validate(&self, request: &Self::Request) -> Result<(), GenerationError>;

    async fn invoke(
        &self,
        service: &dyn GenerativeService,
        request: &Self::Request,
    ) -> Result<Self::Output>;
}

pub struct ArticleTool;

#[async_trait]
impl OneShotTool for ArticleTool {
    type Request = ArticleRequest;
    type Output = GeneratedArticle;

    fn kind(&self) -> ToolKind {
        ToolKind::Article
    }

    fn validate(&self, request: &ArticleRequest) -> Result<(), GenerationError> {
        if request.topic.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Enter a topic for the article.".to_string(),
            ));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        service: &dyn GenerativeService,
        request: &ArticleRequest,
    ) -> Result<GeneratedArticle> {
        service.generate_article(request).await
    }
}

pub struct ConversionTool;

#[async_trait]
impl OneShotTool for ConversionTool {
    type Request = ConversionRequest;
    type Output = ConversionResult;

    fn kind(&self) -> ToolKind {
        ToolKind::Conversion
    }

    fn validate(&self, request: &ConversionRequest) -> Result<(), GenerationError> {
        if request.procedure.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Enter the procedure the patient is considering.".to_string(),
            ));
        }
        Ok(())
    }

    async fn invoke(
        &self,
        service: &dyn GenerativeService,
        request: &ConversionRequest,
    ) -> Result<ConversionResult> {
        service.generate_conversion(request).await
    }
}

pub struct OneShotCoordinator<T: OneShotTool> {
    tool: Arc<T>,
    scope: Arc<Mutex<ToolScope<T::Output>>>,
    service: Arc<dyn GenerativeService>,
}

impl<T: OneShotTool> Clone for OneShotCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            tool: Arc::clone(&self.tool),
            scope: Arc::clone(&self.scope),
            service: Arc::clone(&self.service),
        }
    }
}

impl<T: OneShotTool> OneShotCoordinator<T> {
    pub fn new(tool: T, service: Arc<dyn GenerativeService>) -> Self {
        let kind = tool.kind();
        Self {
            tool: Arc::new(tool),
            scope: Arc::new(Mutex::new(ToolScope::new(kind))),
            service,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.tool.kind()
    }

    pub async fn submit(&self, request: T::Request) -> Result<T::Output, GenerationError> {
        self.tool.validate(&request)?;
        let kind = self.tool.kind();
        let ticket = self.scope.lock().await.begin()?;
        info!("Generating {} (request {})", kind, ticket.request_id);

        let outcome = self.tool.invoke(self.service.as_ref(), &request).await;

        let mut scope = self.scope.lock().await;
        match outcome {
            Ok(output) => {
                scope.succeed(ticket, output.clone());
                Ok(output)
            }
            Err(e) => {
                warn!("{} generation failed: {}", kind, e);
                let err = GenerationError::service(kind, &e);
                scope.fail(ticket, err.to_string());
                Err(err)
            }
        }
    }

    pub async fn current(&self) -> Option<T::Output> {
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
