use std::sync::Arc;

use leafscan::{InferencePipeline, ModelRegistry, PipelineOptions, ServiceConfig};

// ---------------------------------------------------------------------------
// Application context
// ---------------------------------------------------------------------------

/// Everything a handler needs, built once in `main` and never mutated.
pub struct AppContext {
    pub config:   ServiceConfig,
    pub registry: ModelRegistry,
    pub pipeline: InferencePipeline,
}

impl AppContext {
    pub fn new(config: ServiceConfig, registry: ModelRegistry) -> Self {
        let pipeline = InferencePipeline::new(PipelineOptions::from(&config));
        AppContext { config, registry, pipeline }
    }
}

/// Cloned into every request thread.
pub type SharedContext = Arc<AppContext>;
