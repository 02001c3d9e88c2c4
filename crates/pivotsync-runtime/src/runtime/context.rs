use super::EventBus;
use crate::backend::{Invoker, TableApi};
use crate::cache::{RegionCache, ViewCache};
use crate::config::Config;
use pivotsync_types::TableKind;
use std::sync::Arc;

/// State shared by the controller, the editor session and the menu
/// resolver of one table kind.
#[derive(Clone)]
pub struct SyncContext {
    pub api: TableApi,
    pub regions: Arc<RegionCache>,
    pub views: Arc<ViewCache>,
    pub events: EventBus,
    pub config: Arc<Config>,
}

impl SyncContext {
    pub fn new(kind: TableKind, invoker: Arc<dyn Invoker>, config: Config) -> Self {
        Self {
            api: TableApi::new(kind, invoker),
            regions: Arc::new(RegionCache::new()),
            views: Arc::new(ViewCache::new()),
            events: EventBus::default(),
            config: Arc::new(config),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.api.kind()
    }
}
