use std::sync::Arc;

use gleaner_core::{GleanerConfig, SearchService};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
}

impl AppState {
    pub fn new(search: SearchService) -> Self {
        Self { search: Arc::new(search) }
    }

    pub fn from_config(config: &GleanerConfig) -> anyhow::Result<Self> {
        Ok(Self::new(SearchService::from_config(config)?))
    }
}
