use std::sync::Arc;

use shared_config::AppConfig;

use crate::services::{SchedulingLocks, SchedulingStore, SupabaseSchedulingStore};

/// Handles shared by every scheduling request, built once at startup.
#[derive(Clone)]
pub struct SchedulingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn SchedulingStore>,
    pub locks: Arc<SchedulingLocks>,
}

impl SchedulingState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn SchedulingStore>) -> Self {
        Self {
            config,
            store,
            locks: Arc::new(SchedulingLocks::new()),
        }
    }

    pub fn from_config(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(SupabaseSchedulingStore::new(&config));
        Self::new(config, store)
    }
}
