pub mod infographic;
pub mod merge;
pub mod oneshot;
pub mod post;
pub mod status;
pub mod types;

#[cfg(test)]
mod tests;

pub use infographic::{InfographicCoordinator, PendingMedia};
pub use merge::{InfographicSlot, MergeGuard, MergeOutcome};
pub use oneshot::{ArticleTool, ConversionTool, OneShotCoordinator};
pub use post::PostCoordinator;
pub use status::{GenerationError, ToolStatus};
