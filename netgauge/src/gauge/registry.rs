//! The plugin-instance object and its per-context gauge map.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::GaugeConfig;
use crate::network::NetworkBackend;
use crate::request::PollOutcome;
use crate::store::{PayloadStore, StoreError};
use crate::telemetry::{RequestMetrics, TelemetrySnapshot};

use super::events::{ContextId, DrawData, InstallData, MouseEvent};
use super::instance::NetworkGauge;
use super::render::RenderSurface;

/// The plugin instance: one per load, owning everything the gauges share.
///
/// The host may place the gauge on several panels; each placement arrives
/// as its own [`ContextId`] and gets its own [`NetworkGauge`] in an explicit
/// map owned here. Construction happens on plugin load, teardown removes
/// contexts one by one, and dropping the plugin releases the backend.
pub struct Plugin {
    backend: Arc<dyn NetworkBackend>,
    config: GaugeConfig,
    store: Arc<PayloadStore>,
    metrics: Arc<RequestMetrics>,
    gauges: HashMap<ContextId, NetworkGauge>,
}

impl Plugin {
    /// Creates the plugin instance, opening the shared payload store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the work directory cannot be opened.
    pub fn new(backend: Arc<dyn NetworkBackend>, config: GaugeConfig) -> Result<Self, StoreError> {
        let store = Arc::new(PayloadStore::open(
            config.store.directory.clone(),
            config.store.stem.clone(),
            config.store.extension.clone(),
        )?);

        Ok(Self {
            backend,
            config,
            store,
            metrics: Arc::new(RequestMetrics::new()),
            gauges: HashMap::new(),
        })
    }

    /// Installs a gauge for a panel context.
    ///
    /// Re-installing an existing context replaces its gauge, dropping any
    /// requests the old instance still tracked.
    pub fn on_install(&mut self, ctx: ContextId, install: &InstallData) {
        info!(%ctx, size_x = install.size_x, size_y = install.size_y, "gauge installed");
        let mut gauge = NetworkGauge::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.store),
            Arc::clone(&self.metrics),
            self.config.clone(),
        );
        gauge.on_install(install);
        self.gauges.insert(ctx, gauge);
    }

    /// Runs one polling tick for a context.
    ///
    /// # Returns
    ///
    /// The tick's outcome, or `None` for an unknown context.
    pub fn on_tick(&mut self, ctx: ContextId) -> Option<PollOutcome> {
        match self.gauges.get_mut(&ctx) {
            Some(gauge) => Some(gauge.on_tick()),
            None => {
                warn!(%ctx, "tick for unknown context");
                None
            }
        }
    }

    /// Renders a context's gauge if it is dirty.
    ///
    /// # Returns
    ///
    /// True if a frame was produced.
    pub fn on_render(
        &mut self,
        ctx: ContextId,
        draw: &DrawData,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        match self.gauges.get_mut(&ctx) {
            Some(gauge) => gauge.on_render(draw, surface),
            None => false,
        }
    }

    /// Routes a mouse event to a context's gauge.
    pub fn on_mouse(&mut self, ctx: ContextId, event: &MouseEvent) {
        if let Some(gauge) = self.gauges.get_mut(&ctx) {
            gauge.on_mouse(event);
        }
    }

    /// Tears a context down, dropping its gauge and tracked requests.
    ///
    /// # Returns
    ///
    /// True if the context existed.
    pub fn on_teardown(&mut self, ctx: ContextId) -> bool {
        let removed = self.gauges.remove(&ctx).is_some();
        if removed {
            info!(%ctx, "gauge torn down");
        }
        removed
    }

    /// Number of installed contexts.
    pub fn context_count(&self) -> usize {
        self.gauges.len()
    }

    /// A context's gauge, for inspection.
    pub fn gauge(&self, ctx: ContextId) -> Option<&NetworkGauge> {
        self.gauges.get(&ctx)
    }

    /// The shared payload store.
    pub fn store(&self) -> &Arc<PayloadStore> {
        &self.store
    }

    /// Point-in-time copy of the plugin's request counters.
    pub fn telemetry(&self) -> TelemetrySnapshot {
        self.metrics.snapshot()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("contexts", &self.gauges.len())
            .finish()
    }
}
