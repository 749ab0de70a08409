//! A single network-backed gauge instance.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::{ClickAction, GaugeConfig};
use crate::network::{NetworkBackend, RequestId, RequestParam};
use crate::request::{PollOutcome, RequestTracker};
use crate::store::PayloadStore;
use crate::telemetry::RequestMetrics;

use super::events::{DrawData, InstallData, MouseEvent};
use super::render::RenderSurface;

/// Text shown until the first payload arrives.
pub const PLACEHOLDER_TEXT: &str = "Click Here";

/// Font size for the placeholder text.
const PLACEHOLDER_FONT_SIZE: f32 = 200.0;

/// What the gauge currently presents.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// Nothing fetched yet; the placeholder is shown.
    Placeholder,

    /// A payload arrived. `path` is set when persistence succeeded; the
    /// bytes are kept either way so display never depends on the disk.
    Fetched {
        /// Where the payload was persisted.
        path: Option<PathBuf>,
        /// The payload itself.
        bytes: Bytes,
    },
}

/// One panel gauge: submits operations on click, polls them each tick, and
/// redraws when its display state changes.
///
/// The dirty flag gates rendering: a frame is only drawn after install, a
/// consumed payload, or anything else that changes what is on screen.
pub struct NetworkGauge {
    tracker: RequestTracker,
    store: Arc<PayloadStore>,
    metrics: Arc<RequestMetrics>,
    config: GaugeConfig,
    size: (u32, u32),
    display: DisplayState,
    dirty: bool,
}

impl NetworkGauge {
    /// Creates a gauge over shared backend, store, and metrics.
    pub fn new(
        backend: Arc<dyn NetworkBackend>,
        store: Arc<PayloadStore>,
        metrics: Arc<RequestMetrics>,
        config: GaugeConfig,
    ) -> Self {
        let tracker = RequestTracker::new(backend, config.completion_policy);
        Self {
            tracker,
            store,
            metrics,
            config,
            size: (0, 0),
            display: DisplayState::Placeholder,
            dirty: true,
        }
    }

    /// Records the panel dimensions and schedules the first draw.
    pub fn on_install(&mut self, install: &InstallData) {
        self.size = (install.size_x, install.size_y);
        self.dirty = true;
    }

    /// Current display state.
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// True if the next `on_render` will draw.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of requests currently tracked.
    pub fn tracked_requests(&self) -> usize {
        self.tracker.len()
    }

    /// GET URL for the current panel dimensions.
    ///
    /// A dimension of zero, or at or above the configured cutoff, falls
    /// back to the default square size.
    fn fetch_url(&self) -> String {
        let base = self.config.get_url.trim_end_matches('/');
        let (width, height) = self.size;
        let unusable =
            |dimension: u32| dimension == 0 || dimension >= self.config.max_dimension;

        if unusable(width) || unusable(height) {
            format!("{}/{}", base, self.config.default_size)
        } else {
            format!("{}/{}/{}", base, width, height)
        }
    }

    /// Submits a GET for a fresh payload.
    ///
    /// # Returns
    ///
    /// The tracked handle, or `None` if the backend refused.
    pub fn request_fetch(&mut self) -> Option<RequestId> {
        let url = self.fetch_url();
        let id = self.tracker.submit_get(&url);
        match id {
            Some(_) => self.metrics.record_submitted(),
            None => self.metrics.record_refused(),
        }
        id
    }

    /// Submits the configured PUT upload.
    ///
    /// # Returns
    ///
    /// The tracked handle, or `None` if the backend refused.
    pub fn request_upload(&mut self) -> Option<RequestId> {
        let mut param = RequestParam::new();
        for header in &self.config.put_headers {
            param = param.with_header(header.clone());
        }
        param = param.with_body(self.config.put_body.clone().into_bytes());

        let id = self.tracker.submit_put(&self.config.put_url, &param);
        match id {
            Some(_) => self.metrics.record_submitted(),
            None => self.metrics.record_refused(),
        }
        id
    }

    /// Handles a mouse event: a single left or right click triggers the
    /// configured action.
    pub fn on_mouse(&mut self, event: &MouseEvent) {
        if !event.button.triggers_action() {
            return;
        }
        match self.config.click_action {
            ClickAction::Fetch => {
                self.request_fetch();
            }
            ClickAction::Upload => {
                self.request_upload();
            }
        }
    }

    /// One polling tick: drives tracked requests and absorbs any payloads.
    ///
    /// A consumed payload is persisted to the store (persistence failure is
    /// logged, not fatal) and becomes the display state.
    pub fn on_tick(&mut self) -> PollOutcome {
        let store = &self.store;
        let display = &mut self.display;
        let dirty = &mut self.dirty;

        let outcome = self.tracker.poll_once(|id, payload| {
            let path = match store.persist(&payload) {
                Ok(path) => {
                    debug!(%id, path = %path.display(), "payload persisted");
                    Some(path)
                }
                Err(e) => {
                    warn!(%id, error = %e, "failed to persist payload");
                    None
                }
            };
            *display = DisplayState::Fetched {
                path,
                bytes: payload,
            };
            *dirty = true;
        });

        self.metrics.record_poll(&outcome);
        outcome
    }

    /// Draws the gauge if its display state changed since the last draw.
    ///
    /// # Returns
    ///
    /// True if a frame was produced.
    pub fn on_render(&mut self, draw: &DrawData, surface: &mut dyn RenderSurface) -> bool {
        if !self.dirty {
            return false;
        }
        self.dirty = false;

        surface.begin_frame(draw.win_width, draw.win_height, draw.pixel_ratio());
        match &self.display {
            DisplayState::Placeholder => {
                surface.fill_text(
                    draw.win_width / 2.0,
                    draw.win_height / 2.0,
                    PLACEHOLDER_FONT_SIZE,
                    PLACEHOLDER_TEXT,
                );
            }
            DisplayState::Fetched { path, bytes } => {
                surface.draw_payload(path.as_deref(), bytes);
            }
        }
        surface.end_frame();
        true
    }
}

impl std::fmt::Debug for NetworkGauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkGauge")
            .field("size", &self.size)
            .field("tracked", &self.tracker.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauge::render::tests::{DrawCommand, RecordingSurface};
    use crate::gauge::MouseButton;
    use crate::network::ScriptedNetwork;

    fn test_gauge(
        config: GaugeConfig,
    ) -> (Arc<ScriptedNetwork>, tempfile::TempDir, NetworkGauge) {
        let network = Arc::new(ScriptedNetwork::new());
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            PayloadStore::open(
                dir.path(),
                config.store.stem.clone(),
                config.store.extension.clone(),
            )
            .unwrap(),
        );
        let metrics = Arc::new(RequestMetrics::new());
        let gauge = NetworkGauge::new(network.clone(), store, metrics, config);
        (network, dir, gauge)
    }

    #[test]
    fn test_fetch_url_uses_panel_dimensions() {
        let (network, _dir, mut gauge) = test_gauge(GaugeConfig::default());
        gauge.on_install(&InstallData::new(800, 600));

        gauge.request_fetch().unwrap();
        assert_eq!(network.get_urls(), vec!["https://picsum.photos/800/600"]);
    }

    #[test]
    fn test_fetch_url_falls_back_on_unusable_dimensions() {
        let (network, _dir, mut gauge) = test_gauge(GaugeConfig::default());

        // Never installed: dimensions are (0, 0).
        gauge.request_fetch().unwrap();

        gauge.on_install(&InstallData::new(6000, 600));
        gauge.request_fetch().unwrap();

        assert_eq!(
            network.get_urls(),
            vec!["https://picsum.photos/500", "https://picsum.photos/500"]
        );
    }

    #[test]
    fn test_click_triggers_configured_action() {
        let mut config = GaugeConfig::default();
        config.click_action = ClickAction::Upload;
        let (network, _dir, mut gauge) = test_gauge(config);

        gauge.on_mouse(&MouseEvent::click(MouseButton::LeftSingle));
        gauge.on_mouse(&MouseEvent::click(MouseButton::Other(0x40)));

        let puts = network.put_requests();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "https://httpbin.org/anything");
        assert_eq!(puts[0].1.headers().to_vec(), vec!["accept: application/json"]);
        assert_eq!(
            puts[0].1.body(),
            Some(GaugeConfig::default().put_body.as_bytes())
        );
    }

    #[test]
    fn test_tick_persists_payload_and_updates_display() {
        let (network, dir, mut gauge) = test_gauge(GaugeConfig::default());
        gauge.on_install(&InstallData::new(800, 600));
        let id = gauge.request_fetch().unwrap();

        // Render once to clear the install-time dirty flag.
        let mut surface = RecordingSurface::new();
        gauge.on_render(&DrawData::new(800.0, 600.0), &mut surface);
        assert!(!gauge.is_dirty());

        network.complete(id, &b"image-bytes"[..]);
        let outcome = gauge.on_tick();

        assert_eq!(outcome.consumed, 1);
        assert!(gauge.is_dirty());
        match gauge.display() {
            DisplayState::Fetched { path, bytes } => {
                let path = path.as_ref().unwrap();
                assert_eq!(path.file_name().unwrap(), "img0.jpeg");
                assert_eq!(std::fs::read(path).unwrap(), b"image-bytes");
                assert_eq!(&bytes[..], b"image-bytes");
            }
            other => panic!("unexpected display state: {:?}", other),
        }
        drop(dir);
    }

    #[test]
    fn test_render_placeholder_then_payload() {
        let (network, _dir, mut gauge) = test_gauge(GaugeConfig::default());
        gauge.on_install(&InstallData::new(800, 600));
        let draw = DrawData::new(800.0, 600.0);

        let mut surface = RecordingSurface::new();
        assert!(gauge.on_render(&draw, &mut surface));
        assert_eq!(surface.texts(), vec![PLACEHOLDER_TEXT]);

        // Not dirty: no second frame.
        assert!(!gauge.on_render(&draw, &mut surface));

        let id = gauge.request_fetch().unwrap();
        network.complete(id, &b"pic"[..]);
        gauge.on_tick();

        let mut surface = RecordingSurface::new();
        assert!(gauge.on_render(&draw, &mut surface));
        assert!(matches!(
            surface.commands[1],
            DrawCommand::DrawPayload { bytes: 3, .. }
        ));
    }

    #[test]
    fn test_refused_submission_recorded() {
        let (network, _dir, mut gauge) = test_gauge(GaugeConfig::default());
        network.refuse_submissions(true);

        assert!(gauge.request_fetch().is_none());
        assert_eq!(gauge.tracked_requests(), 0);
        assert_eq!(gauge.metrics.snapshot().refused, 1);
    }
}
