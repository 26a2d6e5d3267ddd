//! `AppCore` - the primary application facade.
//!
//! This is the composition root for core services. Adapters receive an
//! `AppCore` instance and use it to reach every operation.

use std::sync::Arc;

use crate::paths::ServerLayout;
use crate::ports::{ArchiveLister, CommandRunner, DiskProbe, StateProbe};
use crate::settings::{ServerSettings, SettingsStore};

use super::{ArtifactInspector, ConfigService, LifecycleCoordinator, LogAccess, StatusService};

/// Infrastructure implementations handed to the core.
#[derive(Clone)]
pub struct CorePorts {
    pub runner: Arc<dyn CommandRunner>,
    pub probe: Arc<dyn StateProbe>,
    pub disk: Arc<dyn DiskProbe>,
    pub archives: Arc<dyn ArchiveLister>,
}

/// The core application facade.
///
/// # Example
///
/// ```ignore
/// let ports = CorePorts { runner, probe, disk, archives };
/// let core = AppCore::new(ServerLayout::under("/terraria"), ServerSettings::default(), ports);
///
/// let worlds = core.inspector().list_worlds();
/// core.coordinator().start().await?;
/// ```
pub struct AppCore {
    layout: Arc<ServerLayout>,
    inspector: Arc<ArtifactInspector>,
    coordinator: LifecycleCoordinator,
    logs: LogAccess,
    status: StatusService,
    config: ConfigService,
}

impl AppCore {
    pub fn new(layout: ServerLayout, settings: ServerSettings, ports: CorePorts) -> Self {
        let layout = Arc::new(layout);
        let dirs = Arc::new(layout.dirs.clone());
        let store = Arc::new(SettingsStore::new(settings));
        let inspector = Arc::new(ArtifactInspector::new(Arc::clone(&dirs), ports.archives));

        Self {
            coordinator: LifecycleCoordinator::new(
                Arc::clone(&layout),
                ports.runner,
                Arc::clone(&ports.probe),
                Arc::clone(&inspector),
                Arc::clone(&store),
            ),
            logs: LogAccess::new(Arc::clone(&inspector)),
            status: StatusService::new(Arc::clone(&layout), ports.probe, ports.disk, Arc::clone(&store)),
            config: ConfigService::new(dirs, store),
            inspector,
            layout,
        }
    }

    pub fn layout(&self) -> &ServerLayout {
        &self.layout
    }

    /// Access the artifact inspector (worlds, backups, log listing).
    pub fn inspector(&self) -> &ArtifactInspector {
        &self.inspector
    }

    /// Access the lifecycle coordinator (all mutations).
    pub const fn coordinator(&self) -> &LifecycleCoordinator {
        &self.coordinator
    }

    pub const fn logs(&self) -> &LogAccess {
        &self.logs
    }

    pub const fn status(&self) -> &StatusService {
        &self.status
    }

    /// Access the settings service.
    pub const fn config(&self) -> &ConfigService {
        &self.config
    }
}
