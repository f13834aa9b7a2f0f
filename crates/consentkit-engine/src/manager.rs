//! ConsentManager: the host-owned handle around one live engine.
//!
//! `update_config` never mutates a running engine: it merges the patch,
//! tears the old engine's surfaces down, drops it, and bootstraps a fresh
//! one. Events always go to the current engine, so input bound to the old
//! surfaces has nowhere to land.

use crate::config::{ConfigPatch, ConsentConfig};
use crate::engine::ConsentEngine;
use crate::surface::SurfaceRenderer;
use consentkit_core::{CategoryId, ConsentMap, Result, UiEvent};
use consentkit_store::KeyValueStorage;
use std::sync::Arc;
use tracing::info;

/// Produces a fresh renderer for every engine the manager builds.
pub type RendererFactory = Box<dyn FnMut() -> Box<dyn SurfaceRenderer>>;

pub struct ConsentManager {
    config: ConsentConfig,
    storage: Arc<dyn KeyValueStorage>,
    renderers: RendererFactory,
    engine: ConsentEngine,
}

impl ConsentManager {
    /// Build and bootstrap the first engine.
    pub fn initialize(
        config: ConsentConfig,
        storage: Arc<dyn KeyValueStorage>,
        mut renderers: RendererFactory,
    ) -> Self {
        let engine = Self::start(&config, &storage, &mut renderers);
        Self {
            config,
            storage,
            renderers,
            engine,
        }
    }

    fn start(
        config: &ConsentConfig,
        storage: &Arc<dyn KeyValueStorage>,
        renderers: &mut RendererFactory,
    ) -> ConsentEngine {
        let mut engine = ConsentEngine::new(config.clone(), storage.clone(), renderers());
        engine.bootstrap();
        engine
    }

    /// Merge `patch` into the current configuration and rebuild from scratch.
    /// On a malformed patch the running engine is left as it was.
    pub fn update_config(&mut self, patch: ConfigPatch) -> Result<()> {
        let next = self.config.apply(patch)?;
        info!("Reconfiguring consent manager");
        self.engine.teardown();
        self.engine = Self::start(&next, &self.storage, &mut self.renderers);
        self.config = next;
        Ok(())
    }

    pub fn handle(&mut self, event: UiEvent) {
        self.engine.handle(event);
    }

    pub fn engine(&self) -> &ConsentEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ConsentEngine {
        &mut self.engine
    }

    pub fn config(&self) -> &ConsentConfig {
        &self.config
    }

    pub fn accepted_categories(&self) -> ConsentMap {
        self.engine.accepted_categories()
    }

    pub fn rejected_categories(&self) -> Vec<CategoryId> {
        self.engine.rejected_categories()
    }

    pub fn consent_version(&self) -> Option<String> {
        self.engine.consent_version()
    }

    pub fn consent_date(&self) -> Option<String> {
        self.engine.consent_date()
    }

    pub fn consent_outdated(&self) -> bool {
        self.engine.consent_outdated()
    }
}
