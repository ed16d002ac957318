//! Execution context shared by the orchestrator, the steps and the worker.

use std::sync::Arc;

use vf_av::ToolRegistry;
use vf_core::config::Config;
use vf_core::events::EventBus;
use vf_core::{JobQueue, VideoStore};

/// Everything a job needs to run.
///
/// Cheap to clone: every field is an `Arc`.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<Config>,
    /// External tool paths resolved at startup.
    pub tools: Arc<ToolRegistry>,
    pub store: Arc<dyn VideoStore>,
    pub queue: Arc<dyn JobQueue>,
    pub events: Arc<EventBus>,
}

impl PipelineContext {
    /// Create a context with a fresh event bus.
    pub fn new(
        config: Config,
        tools: ToolRegistry,
        store: Arc<dyn VideoStore>,
        queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            tools: Arc::new(tools),
            store,
            queue,
            events: Arc::new(EventBus::default()),
        }
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
