use crate::cli::CommandLineArgs;
use crate::processor::TrendProcessor;
use crate::resource_manager::ResourceManager;

use std::sync::Arc;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Trend processor, the owner of the dataset.
    pub processor: TrendProcessor,

    /// Resource manager.
    pub resource_manager: ResourceManager,
}

impl AppState {
    /// Create and return an [AppState].
    pub fn new(args: &CommandLineArgs) -> Self {
        let task_limit = args
            .thread_limit
            .or_else(|| Some(num_cpus::get().saturating_sub(1).max(1)));
        Self {
            processor: TrendProcessor::new(args),
            resource_manager: ResourceManager::new(task_limit),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
