//! Gauge lifecycle: host events, per-context instances, and the plugin
//! object that owns them.
//!
//! The host drives a panel gauge through a fixed callback sequence:
//!
//! ```text
//! on_install ──► [ on_tick ──► on_render ]* ──► on_teardown
//!                     ▲
//!                on_mouse (click → submit fetch/upload)
//! ```
//!
//! [`Plugin`] is the single plugin-instance object: it owns the shared
//! network backend, the payload store, and an explicit map from
//! [`ContextId`] to [`NetworkGauge`]. Each gauge instance tracks its own
//! requests and display state; rendering goes through the [`RenderSurface`]
//! seam so the library stays independent of any concrete graphics stack.
//!
//! # Example
//!
//! ```ignore
//! use netgauge::gauge::{ContextId, InstallData, MouseButton, MouseEvent, Plugin};
//!
//! let mut plugin = Plugin::new(backend, config)?;
//! let ctx = ContextId::new(1);
//!
//! plugin.on_install(ctx, &InstallData::new(800, 600));
//! plugin.on_mouse(ctx, &MouseEvent::click(MouseButton::LeftSingle));
//!
//! // Per frame:
//! plugin.on_tick(ctx);
//! plugin.on_render(ctx, &draw_data, &mut surface);
//! ```

mod events;
mod instance;
mod registry;
mod render;

pub use events::{ContextId, DrawData, InstallData, MouseButton, MouseEvent};
pub use instance::{DisplayState, NetworkGauge, PLACEHOLDER_TEXT};
pub use registry::Plugin;
pub use render::RenderSurface;

#[cfg(test)]
pub use render::tests::{DrawCommand, RecordingSurface};
