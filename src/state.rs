//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{
    AnalyticsService, ClickRecorder, CodeGenerator, LinkRegistry, ReportSettings,
};
use crate::config::Config;
use crate::domain::repositories::PersistenceStore;

/// Engine components wired to one explicit store instance.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PersistenceStore>,
    pub link_registry: Arc<LinkRegistry<dyn PersistenceStore>>,
    pub click_recorder: Arc<ClickRecorder<dyn PersistenceStore>>,
    pub analytics_service: Arc<AnalyticsService<dyn PersistenceStore>>,
    /// Public origin used to render short URLs.
    pub base_url: String,
}

impl AppState {
    /// Wires every service to `store` around the given generator.
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        generator: CodeGenerator<dyn PersistenceStore>,
        report: ReportSettings,
        base_url: impl Into<String>,
    ) -> Self {
        let link_registry = Arc::new(LinkRegistry::new(store.clone(), Arc::new(generator)));
        let click_recorder = Arc::new(ClickRecorder::new(store.clone(), link_registry.clone()));
        let analytics_service = Arc::new(AnalyticsService::with_settings(store.clone(), report));

        Self {
            store,
            link_registry,
            click_recorder,
            analytics_service,
            base_url: base_url.into(),
        }
    }

    /// Builds the state from validated configuration with an OS-seeded generator.
    pub fn from_config(store: Arc<dyn PersistenceStore>, config: &Config) -> Self {
        let generator = CodeGenerator::new(store.clone())
            .length(config.code_length)
            .max_attempts(config.code_max_attempts);

        Self::new(store, generator, config.report_settings(), &config.base_url)
    }

    pub fn short_url(&self, code: &str) -> String {
        LinkRegistry::<dyn PersistenceStore>::short_url(&self.base_url, code)
    }
}
