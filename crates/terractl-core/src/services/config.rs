//! Settings service: view, update and the generated runtime config.

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::paths::Directories;
use crate::ports::CoreError;
use crate::settings::{
    RuntimeConfig, ServerSettings, SettingsStore, SettingsUpdateOutcome, SettingsView,
    runtime_config,
};

pub struct ConfigService {
    dirs: Arc<Directories>,
    store: Arc<SettingsStore>,
}

impl ConfigService {
    pub const fn new(dirs: Arc<Directories>, store: Arc<SettingsStore>) -> Self {
        Self { dirs, store }
    }

    pub fn current(&self) -> Arc<ServerSettings> {
        self.store.snapshot()
    }

    pub fn view(&self) -> SettingsView {
        SettingsView::new(&self.store.snapshot(), &self.dirs)
    }

    pub fn update(&self, patch: &Map<String, Value>) -> Result<SettingsUpdateOutcome, CoreError> {
        self.store.update(patch)
    }

    pub async fn runtime(&self) -> Result<RuntimeConfig, CoreError> {
        runtime_config(&self.dirs).await
    }
}
