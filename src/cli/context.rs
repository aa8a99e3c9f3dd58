//! Wiring of the engines over one storage backend

use std::sync::Arc;

use crate::analytics::AggregationEngine;
use crate::cleanup::CleanupJob;
use crate::config::RetentionConfig;
use crate::retention::RetentionPolicyManager;
use crate::services::CtaService;
use crate::storage::{CtaStore, EventStore, SettingsStore};

/// Every engine the commands need, sharing a single storage
pub struct AppContext {
    pub ctas: CtaService,
    pub retention: Arc<RetentionPolicyManager>,
    pub analytics: AggregationEngine,
    pub cleanup: CleanupJob,
}

impl AppContext {
    pub fn from_storage<S>(storage: Arc<S>, config: &RetentionConfig) -> Self
    where
        S: CtaStore + EventStore + SettingsStore + 'static,
    {
        let cta_store: Arc<dyn CtaStore> = storage.clone();
        let event_store: Arc<dyn EventStore> = storage.clone();
        let settings_store: Arc<dyn SettingsStore> = storage;

        let retention = Arc::new(RetentionPolicyManager::new(settings_store, config.tier));

        Self {
            ctas: CtaService::new(cta_store.clone()),
            analytics: AggregationEngine::new(event_store.clone(), cta_store.clone(), config.tier),
            cleanup: CleanupJob::new(event_store, cta_store, retention.clone()),
            retention,
        }
    }
}
